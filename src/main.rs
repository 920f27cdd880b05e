use log::{error, info};
use parking_lot::Mutex;
use sniff_core::{CaptureLoop, Config, FrameSource, PcapFileSource, Result, StopToken};
use sniff_core::init_logger;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

fn open_source(config: &Config) -> Result<Box<dyn FrameSource + Send>> {
    if let Some(path) = &config.replay_file {
        return Ok(Box::new(PcapFileSource::open(path)?));
    }
    open_live_source(config)
}

#[cfg(target_os = "linux")]
fn open_live_source(config: &Config) -> Result<Box<dyn FrameSource + Send>> {
    Ok(Box::new(sniff_core::RawSocketSource::from_config(config)?))
}

#[cfg(not(target_os = "linux"))]
fn open_live_source(_config: &Config) -> Result<Box<dyn FrameSource + Send>> {
    Err(sniff_core::SniffError::acquisition("raw socket", "live capture is only supported on Linux"))
}

fn print_banner() {
    println!();
    println!("=============================================================");
    println!("              NETWORK PACKET SNIFFER - STARTING              ");
    println!("=============================================================");
    println!("\nPress Ctrl+C to stop capturing and see statistics...\n");
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };
    init_logger(&config);
    print_banner();

    let source = match open_source(&config) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e);
            if config.replay_file.is_none() {
                println!("\nNote: This program requires root privileges!");
                println!("Run with: sudo ./sniffer\n");
            }
            return ExitCode::from(1);
        }
    };
    println!("✓ Frame source opened: {}", source.name());
    println!("✓ Capturing packets on all interfaces...\n");

    let stop = StopToken::new();
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("收到中断信号，停止抓包");
            signal_stop.stop();
        }
    });

    let capture_config = config.clone();
    let handle = tokio::task::spawn_blocking(move || {
        let mut capture = CaptureLoop::from_config(source, &capture_config, stop);
        let output = Arc::new(Mutex::new(io::stdout()));
        let result = capture.run(output);
        (result, capture.processor().render_summary())
    });

    let (result, summary) = match handle.await {
        Ok(done) => done,
        Err(e) => {
            error!("抓包线程异常退出: {}", e);
            return ExitCode::from(1);
        }
    };

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "\n{}", summary);
    let _ = writeln!(stdout, "Packet capture stopped.\n");

    match result {
        Ok(run) => {
            info!("正常退出: {:?}", run);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}
