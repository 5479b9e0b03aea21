//! HDLC Port Scanner
//!
//! Probes every serial port on the host at once and prints the ones that
//! are emitting HDLC frames.

mod settings;

use hdlc_detect::{HdlcScanner, PortScanner, SerialOpener};
use settings::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout carries only results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "hdlc_scan=info,hdlc_detect=info,hdlc_protocol=info,hdlc_sim=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::load();
    tracing::debug!("Using settings: {:?}", settings);

    let scanner = HdlcScanner::with_parts(
        PortScanner::with_config(settings.scanner_config()),
        SerialOpener::new(settings.baud_rate),
        settings.scan_config(),
    );

    let framed = match scanner
        .scan(settings.timeout(), settings.abort_after_first)
        .await
    {
        Ok(framed) => framed,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    if framed.is_empty() {
        println!("no HDLC framed serial ports found");
    }
    for port in framed {
        println!("{}", port);
    }
}
