//! ft857ctl: control a Yaesu FT-857D from the command line
//!
//! Usage:
//!   ft857ctl ports
//!   ft857ctl probe
//!   ft857ctl --port /dev/ttyUSB0 freq 14070000
//!   ft857ctl --port /dev/ttyUSB0 mode USB
//!   ft857ctl --port /dev/ttyUSB0 tone C 885 1000
//!   ft857ctl --sim status
//!   ft857ctl --port /dev/ttyUSB0 --baud 9600 config --save

mod settings;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ft857_protocol::{Mode, RepeaterShift, SquelchMode, ToneKind};
use ft857_sim::{run_virtual_radio_task, VirtualRadio, VirtualRadioCommand};
use ft857_transport::{probe_port, CatTransport, PortScanner, ProbeConfig};
use tokio::io::{duplex, AsyncRead, AsyncWrite};
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::Settings;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Control a Yaesu FT-857D over its binary CAT interface.
#[derive(Parser)]
#[command(name = "ft857ctl", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyUSB0, COM3). Defaults to the saved port.
    #[arg(long)]
    port: Option<String>,

    /// Baud rate; must match the radio's CAT RATE menu setting.
    #[arg(long)]
    baud: Option<u32>,

    /// Reply timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Talk to a virtual radio instead of a serial port.
    #[arg(long)]
    sim: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl Switch {
    fn is_on(self) -> bool {
        matches!(self, Switch::On)
    }
}

#[derive(Subcommand)]
enum Command {
    /// List serial ports.
    Ports,

    /// Look for a radio on one port, or on every port.
    Probe {
        /// Port to probe; all ports when omitted.
        port: Option<String>,
    },

    /// Print frequency, mode, VFO, split and meters.
    Status,

    /// Read the frequency, or set it in Hz.
    Freq {
        /// Frequency in hertz (e.g. 14070000).
        hz: Option<u64>,
    },

    /// Read the mode, or set it (LSB, USB, CW, CWR, AM, WFM, FM, DIG, PKT, FMN).
    Mode { mode: Option<Mode> },

    /// Read the transmit state, or key/unkey the transmitter.
    Ptt {
        #[arg(value_enum)]
        state: Option<Switch>,
    },

    /// Lock or unlock the front panel.
    Lock {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Read split status, or turn split on/off.
    Split {
        #[arg(value_enum)]
        state: Option<Switch>,
    },

    /// Read the active VFO, optionally toggling A/B first.
    Vfo {
        #[arg(long)]
        toggle: bool,
    },

    /// Turn the clarifier on/off and/or set its offset.
    Clar {
        #[arg(value_enum)]
        state: Option<Switch>,

        /// Offset in Hz (10 Hz steps, up to +/-9990).
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<i32>,
    },

    /// Set the repeater shift: "-", "+" or "S" (simplex).
    Shift {
        #[arg(allow_hyphen_values = true)]
        shift: RepeaterShift,
    },

    /// Set the repeater offset in kHz.
    Offset { khz: u32 },

    /// Set the squelch mode (DCS, DDC, DEN, TSQ, TDC, TEN, OFF).
    Squelch { mode: SquelchMode },

    /// Set CTCSS tones (tenths of Hz) or DCS codes.
    Tone {
        /// C for CTCSS, D for DCS.
        kind: ToneKind,
        /// TX tone, e.g. 885 for 88.5 Hz or 23 for DCS 023.
        tx: u16,
        /// RX tone; same as TX when omitted.
        rx: Option<u16>,
    },

    /// Print RX/TX meters and the meter, keyer and DSP settings.
    Meter,

    /// Print the effective settings, or save them as the new defaults.
    Config {
        #[arg(long)]
        save: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ft857ctl=info,ft857_protocol=info,ft857_transport=info,ft857_sim=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = effective_settings(&cli);
    tracing::debug!("Link settings: {:?}", settings.link);

    // Commands that do not need a link
    match &cli.command {
        Command::Ports => return cmd_ports(),
        Command::Probe { port } => return cmd_probe(&settings, &cli, port.as_deref()).await,
        Command::Config { save } => return cmd_config(&settings, *save),
        _ => {}
    }

    if cli.sim {
        return run_on_sim(&settings, &cli.command).await;
    }

    let port = settings
        .port
        .clone()
        .context("no serial port: pass --port or save one with `config --save`")?;
    let mut cat = CatTransport::open(&port, settings.link)
        .with_context(|| format!("failed to open {}", port))?;
    run(&mut cat, &cli.command).await
}

/// Saved settings with command line overrides applied
fn effective_settings(cli: &Cli) -> Settings {
    let mut settings = Settings::load();
    if let Some(port) = &cli.port {
        settings.port = Some(port.clone());
    }
    if let Some(baud) = cli.baud {
        settings.link.baud_rate = baud;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.link.reply_timeout_ms = timeout_ms;
    }
    settings
}

/// Serve a virtual radio over an in-memory pipe and run one command on it
async fn run_on_sim(settings: &Settings, command: &Command) -> Result<()> {
    let (ours, theirs) = duplex(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(4);
    let (state_tx, _state_rx) = broadcast::channel(16);
    let radio = VirtualRadio::from_config(settings.virtual_radio.clone());
    let task = tokio::spawn(run_virtual_radio_task(theirs, radio, cmd_rx, state_tx));

    let mut cat = CatTransport::new("sim", ours, settings.link);
    let result = run(&mut cat, command).await;

    let _ = cmd_tx.send(VirtualRadioCommand::Shutdown).await;
    task.await
        .context("virtual radio task panicked")?
        .context("virtual radio I/O failed")?;
    result
}

// ---------------------------------------------------------------------------
// Commands without a link
// ---------------------------------------------------------------------------

fn cmd_ports() -> Result<()> {
    let ports = PortScanner::new()
        .enumerate_ports()
        .context("failed to enumerate serial ports")?;

    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }

    for port in ports {
        match (port.vid, port.pid) {
            (Some(vid), Some(pid)) => println!(
                "{:<24} {:04X}:{:04X}  {}",
                port.port,
                vid,
                pid,
                port.description()
            ),
            _ => println!("{:<24} {}", port.port, port.description()),
        }
    }
    Ok(())
}

async fn cmd_probe(settings: &Settings, cli: &Cli, port: Option<&str>) -> Result<()> {
    let ports: Vec<String> = match port.or(cli.port.as_deref()) {
        Some(p) => vec![p.to_string()],
        None => PortScanner::new()
            .enumerate_ports()
            .context("failed to enumerate serial ports")?
            .into_iter()
            .map(|p| p.port)
            .collect(),
    };

    let mut config = ProbeConfig::default();
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout = Duration::from_millis(timeout_ms);
    }

    let mut found = 0;
    for port in &ports {
        if let Some(result) = probe_port(port, &settings.probe_baud_rates, &config).await {
            found += 1;
            println!(
                "{}: FT-857D at {} baud, {} {}",
                port,
                result.baud_rate,
                format_mhz(result.frequency_hz),
                result.mode
            );
        }
    }

    if found == 0 {
        bail!("no radio found on {} port(s)", ports.len());
    }
    Ok(())
}

fn cmd_config(settings: &Settings, save: bool) -> Result<()> {
    if save {
        let path = settings.save()?;
        println!("Saved {}", path.display());
    } else {
        if let Some(path) = Settings::settings_path() {
            println!("# {}", path.display());
        }
        println!("{}", settings.to_json()?);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands on a link
// ---------------------------------------------------------------------------

async fn run<T>(cat: &mut CatTransport<T>, command: &Command) -> Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    match command {
        Command::Status => {
            let status = cat.get_frequency_and_mode().await?;
            println!("Frequency: {}", format_mhz(status.hz));
            println!("Mode:      {}", status.mode_name());
            println!("VFO:       {}", cat.get_vfo().await?);
            println!("Split:     {}", on_off(cat.get_split_status().await?));
            let rx = cat.read_rx_status().await?;
            println!("S-meter:   {}", rx.s_meter);
            println!("Squelch:   {}", if rx.squelch_closed { "closed" } else { "open" });
            println!("TX:        {}", on_off(cat.check_tx().await?.is_transmitting()));
        }
        Command::Freq { hz: Some(hz) } => {
            cat.set_frequency(*hz).await?;
            println!("{}", format_mhz(cat.get_frequency().await?));
        }
        Command::Freq { hz: None } => {
            println!("{}", format_mhz(cat.get_frequency().await?));
        }
        Command::Mode { mode: Some(mode) } => {
            cat.set_mode(*mode).await?;
            println!("{}", mode);
        }
        Command::Mode { mode: None } => {
            println!("{}", cat.get_frequency_and_mode().await?.mode_name());
        }
        Command::Ptt { state: Some(state) } => {
            cat.ptt(state.is_on()).await?;
        }
        Command::Ptt { state: None } => {
            let status = cat.read_tx_status().await?;
            if status.state().is_transmitting() {
                let swr = if status.high_swr { "high" } else { "ok" };
                println!("TX (PO {}, SWR {})", status.power_meter, swr);
            } else {
                println!("RX");
            }
        }
        Command::Lock { state } => cat.lock(state.is_on()).await?,
        Command::Split { state: Some(state) } => cat.split(state.is_on()).await?,
        Command::Split { state: None } => {
            println!("{}", on_off(cat.get_split_status().await?));
        }
        Command::Vfo { toggle } => {
            if *toggle {
                cat.switch_vfo().await?;
            }
            println!("{}", cat.get_vfo().await?);
        }
        Command::Clar { state, offset } => {
            if state.is_none() && offset.is_none() {
                bail!("clar needs on/off and/or --offset");
            }
            if let Some(hz) = offset {
                cat.set_clarifier_offset(*hz).await?;
            }
            if let Some(state) = state {
                cat.clarifier(state.is_on()).await?;
            }
        }
        Command::Shift { shift } => cat.set_repeater_shift(*shift).await?,
        Command::Offset { khz } => cat.set_repeater_offset(*khz).await?,
        Command::Squelch { mode } => cat.set_squelch_mode(*mode).await?,
        Command::Tone { kind, tx, rx } => {
            cat.set_squelch_tone_pair(*kind, *tx, rx.unwrap_or(*tx)).await?;
        }
        Command::Meter => {
            let rx = cat.read_rx_status().await?;
            println!("S-meter:      {}", rx.s_meter);
            println!("Squelch:      {}", if rx.squelch_closed { "closed" } else { "open" });
            println!("Tone match:   {}", if rx.tone_unmatched { "no" } else { "yes" });
            println!("Centered:     {}", if rx.discriminator_off_center { "no" } else { "yes" });

            let cw = cat.get_cw_meter_config().await?;
            println!("Meter:        {}", cw.meter);
            println!("Keyer:        {}", on_off(cw.keyer));
            println!("Break-in:     {}", on_off(cw.break_in));

            let dsp = cat.get_agc_dsp_config().await?;
            println!("AGC:          {}", on_off(dsp.agc));
            println!("DSP BPF:      {}", on_off(dsp.bandpass_filter));
            println!("DSP NR:       {}", on_off(dsp.noise_reduction));
            println!("DSP notch:    {}", on_off(dsp.notch_filter));
        }
        Command::Ports | Command::Probe { .. } | Command::Config { .. } => {
            bail!("this command does not use a radio link")
        }
    }
    Ok(())
}

fn format_mhz(hz: u64) -> String {
    format!("{}.{:06} MHz", hz / 1_000_000, hz % 1_000_000)
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}
