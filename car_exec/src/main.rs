//! Main car-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise session, logging and parameters
//!     - Build the bench equipment and both axis state machines
//!     - Assemble the scheduler task table (servo axis ahead of motor axis)
//!     - Main loop, once per base tick:
//!         - Stick input acquisition (apply pending profile samples)
//!         - Scheduler processing (advance every due task)
//!         - Telemetry
//!         - Cycle management
//!
//! The loop stands in for the hardware periodic timer: it paces itself to
//! the scheduler's base period and runs the whole task table synchronously
//! within each tick.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use car_lib::{
    eqpt::bench::{BenchAdc, BenchMotorBus, BenchServo},
    eqpt::AnalogMux,
    motor_axis::{self, MotorAxis},
    servo_axis::{self, ServoAxis},
    stick_profile::{PendingSamples, StickProfile},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, trace, warn};
use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    sched::{Scheduler, Task},
    session::{get_elapsed_seconds, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Limit on the number of consecutive cycle overruns before the exec stops.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 500;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("car_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Car Control Executable\n");
    info!("Software root: {:?}", host::get_sw_root());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    // Parameter files degrade to the bench defaults rather than aborting,
    // the loop must come up even with a broken config on disk.
    let exec_params: car_lib::params::Params = match util::params::load("car_exec.toml") {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not load exec parameters, using defaults: {}", e);
            Default::default()
        }
    };

    let servo_params: servo_axis::Params = match util::params::load("servo_axis.toml") {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not load servo axis parameters, using defaults: {}", e);
            Default::default()
        }
    };

    let motor_params: motor_axis::Params = match util::params::load("motor_axis.toml") {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not load motor axis parameters, using defaults: {}", e);
            Default::default()
        }
    };

    info!("Parameters loaded");

    // ---- INITIALISE STICK PROFILE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the profile path
    let mut profile = if args.len() == 2 {
        info!("Loading stick profile from \"{}\"", &args[1]);

        StickProfile::from_file(&args[1]).wrap_err("Failed to load the stick profile")?
    }
    // If no arguments use the built-in sweep
    else if args.len() == 1 {
        info!("No profile provided, using the built-in sweep profile");

        StickProfile::sweep()
    }
    else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    };

    info!(
        "Profile lasts {:.02} s and contains {} steps\n",
        profile.get_duration(),
        profile.get_num_steps()
    );

    // ---- INITIALISE EQUIPMENT ----

    info!("Initialising bench equipment...");

    let adc = Rc::new(RefCell::new(BenchAdc::new()));
    adc.borrow_mut().enable();

    let servo = Rc::new(RefCell::new(BenchServo::new(exec_params.servo_pwm_reload)));
    let motor_bus = Rc::new(RefCell::new(BenchMotorBus::new()));

    info!("Bench equipment initialisation complete\n");

    // The profile writes into the axes' channels, so keep the channel
    // numbers before the parameters move into the machines
    let x_channel = servo_params.channel;
    let y_channel = motor_params.channel;

    // ---- ASSEMBLE SCHEDULER ----

    let base_period = Duration::from_millis(exec_params.base_period_ms);

    let mut sched = Scheduler::new(base_period);

    sched.install(Task::new(
        ServoAxis::new(servo_params, Rc::clone(&adc), Rc::clone(&servo)),
        servo_axis::AxisState::Start,
        Duration::from_millis(exec_params.servo_period_ms),
    ));
    sched.install(Task::new(
        MotorAxis::new(motor_params, Rc::clone(&adc), Rc::clone(&motor_bus)),
        motor_axis::AxisState::Start,
        Duration::from_millis(exec_params.motor_period_ms),
    ));

    info!(
        "Scheduler initialised with {} tasks at a {} ms base period",
        sched.num_tasks(),
        exec_params.base_period_ms
    );

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut num_ticks: u64 = 0;
    let mut num_consec_overruns: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- STICK INPUT ----

        match profile.get_pending(get_elapsed_seconds()) {
            PendingSamples::None => (),
            PendingSamples::Some(steps) => {
                let mut adc = adc.borrow_mut();
                for step in steps.iter() {
                    adc.set_sample(x_channel, step.x);
                    adc.set_sample(y_channel, step.y);

                    debug!("Stick sample applied: x {} y {}", step.x, step.y);
                }
            }
            // Exit if end of profile reached
            PendingSamples::EndOfProfile => {
                info!("End of stick profile reached, stopping");
                break;
            }
        }

        // ---- SCHEDULER PROCESSING ----

        sched.on_tick();

        // ---- TELEMETRY ----

        trace!(
            "Servo compare: {:?}, motor direction: {:?}",
            servo.borrow().last_compare(),
            motor_bus.borrow().last_direction()
        );

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match base_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - base_period.as_secs_f64()
                );
                num_consec_overruns += 1;

                if num_consec_overruns > MAX_CONSEC_CYCLE_OVERRUNS {
                    return Err(eyre!(
                        "More than {} consecutive cycle overruns",
                        MAX_CONSEC_CYCLE_OVERRUNS
                    ));
                }
            }
        }

        // Increment tick counter
        num_ticks += 1;
    }

    // ---- SHUTDOWN ----

    info!("Ran {} scheduler ticks", num_ticks);
    info!("End of execution");

    Ok(())
}
