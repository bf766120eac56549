use std::env;
use std::time::{Duration, Instant};

use bench_psu::session::Session;
use inquire::Select;

// Configuration constants - adjust these for your setup
const OUTPUT_VOLTAGE_V: f64 = 5.0;
const CURRENT_LIMIT_A: f64 = 0.1;
const POLL_INTERVAL: Duration = Duration::from_secs(1);

fn main() {
    env_logger::init();

    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        // List available serial ports
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        // Interactive selection
        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    let mut session = Session::new();
    session.connect(&port_name).expect("Failed to open serial port");
    session.set_trace(true);

    session.subscribe(|voltage, current, output| {
        println!(
            "{:6.2} V  {:6.3} A  output {}",
            voltage,
            current,
            if output { "on" } else { "off" }
        );
    });

    // Program a modest setpoint and switch the output on.
    session.set_voltage(OUTPUT_VOLTAGE_V).unwrap();
    session.set_current(CURRENT_LIMIT_A).unwrap();
    session.set_output(true).unwrap();
    println!(
        "Set {} V / {} A, output enabled",
        OUTPUT_VOLTAGE_V, CURRENT_LIMIT_A
    );

    // Poll until interrupted, printing each measurement as it decodes.
    session.start_polling(POLL_INTERVAL);
    loop {
        session.service(Instant::now());
        std::thread::sleep(Duration::from_millis(50));
    }
}
