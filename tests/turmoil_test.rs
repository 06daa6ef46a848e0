// Full sender/receiver sessions over turmoil's simulated network, through the
// same Listener and ConnectStream traits the binaries use.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;
use serial_test::serial;
use tcpbench::client::{self, Strategy};
use tcpbench::config::{ReceiverParams, SenderParams};
use tcpbench::server;
use tokio::time::sleep;
use tracing::info;
use turmoil::{
    Builder, Result,
    net::{TcpListener, TcpStream},
};

const PORT: u16 = 1738;
const UNSET: u32 = u32::MAX;

/// Every write turns into one simulated segment and the sender never waits
/// for the receiver, so the socket buffer must hold a whole session.
fn sim_for(nreps: u32, nbufs: usize) -> turmoil::Sim<'static> {
    Builder::new()
        .tcp_capacity(64 + nreps as usize * nbufs)
        .build()
}

type SimResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

static INIT: Lazy<()> = Lazy::new(|| {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_test_writer()
        .init();
});

/// Counts observed on each side of one simulated run.
#[derive(Default)]
struct Observed {
    server_short_reads: AtomicU32,
    server_bytes: AtomicU64,
    client_ack: AtomicU32,
    client_bytes: AtomicU64,
}

fn simulate(strategy: Strategy, nreps: u32, nbufs: usize, bufsize: usize) -> SimResult<Arc<Observed>> {
    Lazy::force(&INIT);
    let observed = Arc::new(Observed::default());
    observed.server_short_reads.store(UNSET, Ordering::SeqCst);
    observed.client_ack.store(UNSET, Ordering::SeqCst);

    let mut sim = sim_for(nreps, nbufs);

    let server_side = observed.clone();
    sim.host("server", move || {
        let observed = server_side.clone();
        async move {
            let params = ReceiverParams::new(PORT, nreps)?.with_frame_size(nbufs * bufsize)?;
            let listener: TcpListener = server::bind(&params).await?;
            let report = server::accept_session(&listener, &params).await?;
            info!(?report, "server done");

            let frames = report.frames;
            assert_eq!(frames.frames, nreps);
            assert_eq!(frames.reads, frames.short_reads as u64 + nreps as u64);
            observed
                .server_short_reads
                .store(frames.short_reads, Ordering::SeqCst);
            observed.server_bytes.store(frames.bytes, Ordering::SeqCst);
            Ok(())
        }
    });

    let client_side = observed.clone();
    sim.client("client", async move {
        // let the server bind first
        sleep(Duration::from_millis(10)).await;

        let params = SenderParams::new(PORT, nreps, nbufs, bufsize, "server", strategy)?;
        let report = client::run::<TcpStream>(&params).await?;
        info!(%report, "client done");

        assert!(report.sending_usec <= report.round_trip_usec);
        client_side.client_ack.store(report.reads, Ordering::SeqCst);
        client_side
            .client_bytes
            .store(report.transmit.bytes, Ordering::SeqCst);
        Ok(())
    });

    sim.run()?;
    Ok(observed)
}

fn assert_session(observed: &Observed, total_bytes: u64) {
    let ack = observed.client_ack.load(Ordering::SeqCst);
    assert_ne!(ack, UNSET, "client never saw the ack");
    assert_eq!(ack, observed.server_short_reads.load(Ordering::SeqCst));
    assert_eq!(observed.client_bytes.load(Ordering::SeqCst), total_bytes);
    assert_eq!(observed.server_bytes.load(Ordering::SeqCst), total_bytes);
}

#[test]
#[serial]
fn single_write_one_message() -> Result {
    let observed = simulate(Strategy::Single, 1, 30, 50)?;
    assert_session(&observed, 1500);
    assert!(observed.client_ack.load(Ordering::SeqCst) <= 29);
    Ok(())
}

#[test]
#[serial]
fn single_write_five_messages() -> Result {
    let observed = simulate(Strategy::Single, 5, 30, 50)?;
    assert_session(&observed, 7500);
    Ok(())
}

#[test]
#[serial]
fn multiple_writes() -> Result {
    let observed = simulate(Strategy::Multiple, 30, 50, 30)?;
    assert_session(&observed, 45_000);
    Ok(())
}

#[test]
#[serial]
fn vectored_writes() -> Result {
    let observed = simulate(Strategy::Vectored, 30, 50, 30)?;
    assert_session(&observed, 45_000);
    Ok(())
}

#[test]
#[serial]
fn server_serves_sessions_in_turn() -> Result {
    Lazy::force(&INIT);
    let (nreps, nbufs, bufsize) = (10, 50, 30);
    let mut sim = sim_for(nreps, nbufs);

    let reports = Arc::new(Mutex::new(Vec::new()));
    let acks = Arc::new(Mutex::new(Vec::new()));

    let server_side = reports.clone();
    sim.host("server", move || {
        let reports = server_side.clone();
        async move {
            let params = ReceiverParams::new(PORT, nreps)?
                .with_frame_size(nbufs * bufsize)?
                .with_sessions(2)?;
            let listener: TcpListener = server::bind(&params).await?;
            server::serve(&listener, &params, |report| {
                reports.lock().unwrap().push(*report);
            })
            .await?;
            Ok(())
        }
    });

    let client_side = acks.clone();
    sim.client("client", async move {
        sleep(Duration::from_millis(10)).await;
        for strategy in [Strategy::Multiple, Strategy::Single] {
            let params = SenderParams::new(PORT, nreps, nbufs, bufsize, "server", strategy)?;
            let report = client::run::<TcpStream>(&params).await?;
            client_side.lock().unwrap().push(report.reads);
        }
        Ok(())
    });

    sim.run()?;

    let reports = reports.lock().unwrap();
    let acks = acks.lock().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(acks.len(), 2);
    for (report, ack) in reports.iter().zip(acks.iter()) {
        assert_eq!(report.frames.frames, nreps);
        assert_eq!(report.frames.bytes, 15_000);
        assert_eq!(report.frames.short_reads, *ack);
    }
    Ok(())
}

#[test]
#[serial]
fn client_fails_when_server_hangs_up() -> Result {
    Lazy::force(&INIT);
    let mut sim = sim_for(1, 30);

    sim.host("server", || async {
        let params = ReceiverParams::new(PORT, 1)?;
        let listener: TcpListener = server::bind(&params).await?;
        // Accept and close without reading or acknowledging anything.
        let (stream, _) = tcpbench::net::Listener::accept(&listener).await?;
        drop(stream);
        Ok(())
    });

    sim.client("client", async {
        sleep(Duration::from_millis(10)).await;
        let params = SenderParams::new(PORT, 1, 30, 50, "server", Strategy::Single)?;
        let err = client::run::<TcpStream>(&params).await.unwrap_err();
        assert_eq!(tcpbench::error::exit_code_of(&err), 4);
        Ok(())
    });

    sim.run()
}
