use anyhow::{Context, Result};
use log::warn;
use scilink::{
    SamplingConfig, SerialTransport, SessionController, ToneComponent, Transport, Waveform,
    find_usb_port, remove_dc, spectrum,
};
use std::io::{BufRead, Write};
use std::time::Duration;

const HELP: &str = "\
scilink - terminal for the serial-linked DSP target

USAGE:
  scilink [--port NAME] [--baud BPS] [--timeout SECS] [--gap MS]

OPTIONS:
  --port NAME     serial port (default: first USB serial port found)
  --baud BPS      baud rate (default 115200)
  --timeout SECS  response timeout (default 2.0)
  --gap MS        pause between waveform sample frames (default 1)
";

fn prompt(text: &str) -> Result<String> {
    print!("{text}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

// Collects (frequency, amplitude) pairs until the user stops adding them.
fn read_tones() -> Result<Vec<ToneComponent>> {
    let mut tones = Vec::new();

    loop {
        let frequency_hz: f64 = match prompt("Frequency (Hz): ")?.parse() {
            Ok(f) => f,
            Err(_) => {
                println!("Please enter a numeric frequency.");
                continue;
            }
        };
        let amplitude: f64 = match prompt("Amplitude (0..1): ")?.parse() {
            Ok(a) => a,
            Err(_) => {
                println!("Please enter a numeric amplitude.");
                continue;
            }
        };

        tones.push(ToneComponent {
            frequency_hz,
            amplitude,
        });

        if prompt("Add another tone? (y/n): ")?.to_lowercase() != "y" {
            break;
        }
    }

    Ok(tones)
}

fn print_waveform(wave: &[i16]) {
    for row in wave.chunks(10) {
        let cells: Vec<String> = row.iter().map(|s| format!("{s:>6}")).collect();
        println!("{}", cells.join(" "));
    }
}

fn do_push_scalar<T: Transport>(
    session: &mut SessionController<T>,
    config: &mut SamplingConfig,
) -> Result<()> {
    let input = prompt("Sampling parameter to send (0..100): ")?;
    let value: i16 = match input.parse() {
        Ok(v) => v,
        Err(_) => {
            println!("Not an integer: {input}");
            return Ok(());
        }
    };

    match session.push_scalar(value, config) {
        Ok(()) => println!("Sent sampling parameter {value}."),
        Err(e) => println!("ERROR: {e}"),
    }
    Ok(())
}

fn do_pull_scalar<T: Transport>(
    session: &mut SessionController<T>,
    config: &mut SamplingConfig,
) {
    match session.pull_scalar(config) {
        Ok(value) => println!("Target reports sampling parameter {value}."),
        Err(e) => println!("ERROR: {e}"),
    }
}

fn do_push_waveform<T: Transport>(
    session: &mut SessionController<T>,
    config: &mut SamplingConfig,
) -> Result<()> {
    let tones = read_tones()?;
    match session.push_waveform(&tones, config) {
        Ok(wave) => {
            println!("Uploaded {}-sample waveform:", wave.len());
            print_waveform(&wave);
        }
        Err(e) => println!("ERROR: {e}"),
    }
    Ok(())
}

fn do_pull_waveform<T: Transport>(session: &mut SessionController<T>, config: &SamplingConfig) {
    let wave: Waveform = match session.pull_waveform() {
        Ok(w) => w,
        Err(e) => {
            println!("ERROR: {e}");
            return;
        }
    };

    println!("Received {}-sample waveform:", wave.len());
    print_waveform(&wave);

    let centered = remove_dc(&wave);
    let centered_codes: Vec<i16> = centered.iter().map(|v| v.round() as i16).collect();
    let bins = spectrum(
        &centered_codes,
        config.effective_sample_rate_hz(),
        config.dac_resolution_bits,
    );

    println!("\nSpectrum ({} bins):", bins.len());
    println!("{:>10}  {:>10}", "freq [Hz]", "magnitude");
    for bin in &bins {
        println!("{:>10.1}  {:>10.5}", bin.freq_hz, bin.magnitude);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let port_name: String = match pargs.opt_value_from_str("--port")? {
        Some(name) => name,
        None => find_usb_port().context("no --port given and discovery failed")?,
    };
    let baud: u32 = pargs.opt_value_from_str("--baud")?.unwrap_or(115_200);
    let timeout: f64 = pargs.opt_value_from_str("--timeout")?.unwrap_or(2.0);
    let gap_ms: u64 = pargs.opt_value_from_str("--gap")?.unwrap_or(1);

    let leftover = pargs.finish();
    if !leftover.is_empty() {
        warn!("Ignoring unknown arguments: {leftover:?}");
    }

    let transport = SerialTransport::open(
        &port_name,
        baud,
        Duration::from_secs_f64(timeout),
        Some(Duration::from_millis(gap_ms)),
    )?;
    let mut session = SessionController::new(transport);
    let mut config = SamplingConfig::default();

    println!("--- DSP target terminal on {port_name} ---");

    loop {
        println!("\n----- MENU -----");
        println!("1. Send sampling parameter");
        println!("2. Read sampling parameter");
        println!("3. Upload a waveform");
        println!("4. Download the captured waveform");
        println!("0. Quit");

        match prompt("Choice: ")?.as_str() {
            "1" => do_push_scalar(&mut session, &mut config)?,
            "2" => do_pull_scalar(&mut session, &mut config),
            "3" => do_push_waveform(&mut session, &mut config)?,
            "4" => do_pull_waveform(&mut session, &config),
            "0" => break,
            other => println!("Invalid option: {other}"),
        }
    }

    Ok(())
}
