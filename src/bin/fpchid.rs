// fpchid CLI
// Use a phone's fingerprint sensor or touchscreen as a host keyboard

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;

use fpchid_core::event::{self, AdbBridge, StopReason};
use fpchid_core::input::{discover_sensors, parse_inventory, DiscoveryOptions, Sensor};
use fpchid_core::{
    Actuator, BinaryInterpreter, DryRunActuator, Interpreter, Key, KeyBinding, Profile,
    ProfileInterpreter, VirtualKeyboard,
};

/// Use your fingerprint scanner as a HID device
#[derive(Parser, Debug)]
#[command(name = "fpchid")]
#[command(version)]
#[command(about = "Use your phone's fingerprint sensor or touchscreen as a keyboard", long_about = None)]
struct Args {
    /// Force device path instead of detecting a fingerprint sensor
    #[arg(long, value_name = "DEVICE")]
    device: Option<String>,

    /// Key to press in fingerprint mode
    #[arg(long, value_name = "KEY", default_value = "z")]
    key: String,

    /// Ignore known devices list
    #[arg(long)]
    ignore_known: bool,

    /// Key-binding profile: a TOML file, or a name under the config directory
    #[arg(short, long, value_name = "PROFILE")]
    profile: Option<String>,

    /// adb device serial
    #[arg(short, long, value_name = "SERIAL")]
    serial: Option<String>,

    /// adb executable
    #[arg(long, value_name = "PATH", default_value = "adb")]
    adb: String,

    /// Log key actions instead of injecting them
    #[arg(long)]
    dry_run: bool,

    /// List input devices on the phone and exit
    #[arg(long)]
    list_devices: bool,

    /// Validate the profile and exit
    #[arg(long, requires = "profile")]
    check_profile: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Main application state
struct Application {
    args: Args,
    bridge: AdbBridge,
    /// Flag to signal the run loop to stop
    running: Arc<AtomicBool>,
}

impl Application {
    fn new(args: Args) -> Self {
        let bridge = AdbBridge::new(args.adb.clone()).with_serial(args.serial.clone());
        Self {
            args,
            bridge,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    fn load_profile(&self) -> anyhow::Result<Option<Profile>> {
        let Some(arg) = self.args.profile.as_deref() else {
            return Ok(None);
        };

        let path = Profile::resolve_path(arg)?;
        let profile = Profile::from_toml_path(&path)
            .with_context(|| format!("Failed to load profile {}", path.display()))?;
        log::info!(
            "Loaded profile '{}' with {} binding(s) from {}",
            profile.name,
            profile.bindings.len(),
            path.display()
        );
        Ok(Some(profile))
    }

    /// Validate and summarize the profile
    fn check_profile(&self) -> anyhow::Result<()> {
        let profile = self
            .load_profile()?
            .ok_or_else(|| anyhow!("--check-profile needs --profile"))?;

        println!("Profile '{}' is valid", profile.name);
        if let Some(device) = &profile.device {
            println!("  device: {}", device);
        }
        for binding in &profile.bindings {
            match binding {
                KeyBinding::Digital { key, code } => {
                    println!("  key    {:<12} code={:#06x}", key.to_string(), code)
                }
                KeyBinding::Region { key, x, y } => {
                    println!("  abs    {:<12} x={:?} y={:?}", key.to_string(), x, y)
                }
            }
        }
        Ok(())
    }

    /// List input devices on the phone
    fn list_devices(&self) -> anyhow::Result<()> {
        let devices = parse_inventory(&self.bridge.inventory()?);
        let sensors = discover_sensors(&devices, &self.discovery_options());

        println!("Found {} input device(s):", devices.len());
        for device in &devices {
            let marker = match sensors.iter().find(|s| s.path == device.path) {
                Some(sensor) if sensor.is_exact() => " [known sensor]",
                Some(_) => " [possible sensor]",
                None => "",
            };
            println!("  {}: {}{}", device.path, device.name, marker);
        }
        Ok(())
    }

    fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            ignore_known: self.args.ignore_known,
        }
    }

    fn find_sensors(&self) -> anyhow::Result<Vec<Sensor>> {
        if let Some(device) = &self.args.device {
            return Ok(vec![Sensor::forced(device.clone())]);
        }

        let inventory = self
            .bridge
            .inventory()
            .context("Failed to read the device list")?;
        Ok(discover_sensors(
            &parse_inventory(&inventory),
            &self.discovery_options(),
        ))
    }

    /// Pick profile mode or fingerprint mode. `None` means nothing to listen to.
    fn build_interpreter(&self) -> anyhow::Result<Option<Interpreter>> {
        if let Some(profile) = self.load_profile()? {
            return Ok(Some(ProfileInterpreter::new(profile).into()));
        }

        let key: Key = self.args.key.parse().map_err(anyhow::Error::msg)?;
        let sensors = self.find_sensors()?;
        if sensors.is_empty() {
            return Ok(None);
        }

        for sensor in &sensors {
            log::info!("Listening on {} ({})", sensor.path, sensor.name);
        }
        Ok(Some(BinaryInterpreter::new(sensors, key).into()))
    }

    fn create_actuator(&self) -> anyhow::Result<Box<dyn Actuator>> {
        if self.args.dry_run {
            return Ok(Box::new(DryRunActuator::new()));
        }
        let keyboard = VirtualKeyboard::new()
            .context("Failed to create the virtual keyboard (is /dev/uinput writable?)")?;
        Ok(Box::new(keyboard))
    }

    /// Stop the run loop on SIGINT/SIGTERM
    fn install_signal_handler(&self) -> anyhow::Result<()> {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let running = self.running.clone();
        std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                log::info!("Received signal {}, shutting down", signal);
                running.store(false, Ordering::SeqCst);
            }
        });
        Ok(())
    }

    /// Run the main event processing loop
    fn run(&self) -> anyhow::Result<ExitCode> {
        let Some(mut interpreter) = self.build_interpreter()? else {
            println!("Cannot find a fingerprint scanner");
            println!("If you think this is a mistake, then run fpchid with --device");
            return Ok(ExitCode::SUCCESS);
        };

        self.install_signal_handler()?;

        // Declared before the stream so it is dropped after it: getevent is
        // killed first, then held keys are released.
        let mut actuator = self.create_actuator()?;
        let stream = self.bridge.stream()?;

        println!("fpchid ready ({} mode)", interpreter.mode_name());

        let summary = event::run(&stream, &mut interpreter, &mut actuator, &self.running)?;
        log::info!(
            "Processed {} line(s), {} key action(s)",
            summary.lines,
            summary.actions
        );

        match summary.stop {
            StopReason::Interrupted => Ok(ExitCode::SUCCESS),
            StopReason::StreamClosed => Err(anyhow!("event stream closed")),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let app = Application::new(args);

    let result = if app.args.list_devices {
        app.list_devices().map(|_| ExitCode::SUCCESS)
    } else if app.args.check_profile {
        app.check_profile().map(|_| ExitCode::SUCCESS)
    } else {
        app.run()
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            println!("Shutting down: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
