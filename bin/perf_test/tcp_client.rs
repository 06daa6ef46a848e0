// Sends nreps x nbufs x bufsize bytes to a tcp_server with one of three write
// strategies and reports the sending and round-trip times.

use clap::Parser;
use std::process::ExitCode;
use tcpbench::client;
use tcpbench::config::{SenderArgs, SenderParams};
use tcpbench::error::exit_code_of;
use tcpbench::logging;
use tokio::net::TcpStream;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = SenderArgs::parse();
    let _guard = logging::init(args.chrome_trace.as_deref());
    let program = std::env::args().next().unwrap_or_else(|| "tcp_client".to_string());

    let params = match SenderParams::try_from(&args) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("{}: {}", program, e);
            return ExitCode::from(e.exit_code());
        }
    };

    match client::run::<TcpStream>(&params).await {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {:#}", program, e);
            ExitCode::from(exit_code_of(&e))
        }
    }
}
