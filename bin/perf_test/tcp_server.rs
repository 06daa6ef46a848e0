// Accepts a tcp_client session, counts the reads needed to reassemble each
// message and sends the count back.

use clap::Parser;
use std::process::ExitCode;
use tcpbench::config::{ReceiverArgs, ReceiverParams};
use tcpbench::error::exit_code_of;
use tcpbench::logging;
use tcpbench::net::utils::display_name;
use tcpbench::server;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = ReceiverArgs::parse();
    let _guard = logging::init(args.chrome_trace.as_deref());
    let program = std::env::args().next().unwrap_or_else(|| "tcp_server".to_string());

    let params = match ReceiverParams::try_from(&args) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("{}: {}", program, e);
            return ExitCode::from(e.exit_code());
        }
    };

    match serve(&params).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", program, e);
            ExitCode::from(exit_code_of(&e))
        }
    }
}

async fn serve(params: &ReceiverParams) -> anyhow::Result<()> {
    let listener: TcpListener = server::bind(params).await?;
    info!(
        host = %display_name(),
        port = params.port,
        nreps = params.nreps,
        frame_size = params.frame_size,
        "listening"
    );

    server::serve(&listener, params, |report| println!("{}", report)).await
}
