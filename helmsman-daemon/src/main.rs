mod bus_client;
mod config;

use std::path::PathBuf;

use bus_proto::BusMessage;
use clap::Parser;
use config::DaemonConfig;
use sailcore::{ControllerInput, FilterBlock, Helmsman, ModeRequest, SkipperState};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use bus_client::BusClient;

/// Control daemon for the sailing core: connects to the line bus, runs one
/// 100ms tick of sensor fusion + Skipper + Helmsman, and publishes the
/// resulting drive references.
#[derive(Parser, Debug)]
#[command(name = "helmsman-daemon")]
struct Args {
    /// Unix-domain socket of the line bus.
    socket: PathBuf,

    /// Optional TOML config file (plan, tick period overrides).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Foreground with logs to stderr (always true here; kept for the
    /// conventional CLI surface shared by the bus daemons).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Verbose logging (debug-level tracing instead of info).
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "helmsman_daemon=debug" } else { "helmsman_daemon=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .init();
    let _ = args.debug; // foreground-with-stderr-logging is this process's only mode

    if let Err(e) = run(args).await {
        tracing::error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut cfg = DaemonConfig::load(args.config.as_deref())?;
    cfg.socket_path = args.socket;
    info!("helmsman-daemon starting, socket={}", cfg.socket_path.display());

    let (message_tx, mut message_rx) = mpsc::channel::<BusMessage>(256);
    let bus = BusClient::connect(&cfg.socket_path, message_tx).await?;

    let mut filter_block = FilterBlock::new();
    let mut helmsman = Helmsman::new();
    let mut skipper = SkipperState::new();
    let plan_len = cfg.plan.len();
    if let Some(cascade) = cfg.build_cascade() {
        skipper.load_plan(cascade);
        info!("loaded plan with {plan_len} target circle(s)");
    } else {
        warn!("no plan configured; skipper will fall back to the default bearing");
    }

    let mut mailbox = Mailbox::default();
    let mut ticker = interval(Duration::from_millis(cfg.tick_period_ms));
    let mut alpha_star_rad = 0.0;

    loop {
        ticker.tick().await;

        while let Ok(msg) = message_rx.try_recv() {
            mailbox.absorb(msg);
        }

        let mut input = mailbox.to_controller_input();
        let filtered = filter_block.step(&input, input.drives.gamma_sail_rad);

        // The skipper needs true wind to pick a sailable heading; until the
        // 100s averaging window fills, hold the last goal (Test/Initial
        // don't consult it at all, and NormalController won't be entered
        // until Initial reports a stable bearing and steerageway).
        if filtered.valid_true_wind {
            let contacts = mailbox.ais_contacts();
            alpha_star_rad = skipper.run(filtered.position(), filtered.alpha_true, filtered.mag_true, &contacts);
        } else {
            debug!("holding last heading goal: true wind not yet valid");
        }
        input.alpha_star_rad = alpha_star_rad;

        let output = helmsman.run(&input, &filtered, ModeRequest::None);
        debug!(state = ?output.status.helmsman_state, tacks = output.status.tacks, jibes = output.status.jibes, "tick");
        publish_rudderctl(&bus, &output);
    }
}

fn publish_rudderctl(bus: &BusClient, output: &sailcore::ControllerOutput) {
    let timestamp_ms = 0; // wall-clock comes from the bus daemon's own timestamping upstream
    let msg = BusMessage::RudderCtl(bus_proto::RudderCtlMessage(bus_proto::RudderAngles {
        timestamp_ms,
        rudder_l_deg: output.drives_reference.gamma_rudder_left_rad.to_degrees(),
        rudder_r_deg: output.drives_reference.gamma_rudder_right_rad.to_degrees(),
        sail_deg: output.drives_reference.gamma_sail_rad.to_degrees(),
    }));
    bus.publish(&msg);
}

/// Latest sample per source, updated as bus lines arrive and polled once a
/// tick, per spec's "mailbox-per-source" ordering guarantee.
#[derive(Default)]
struct Mailbox {
    imu: Option<bus_proto::ImuMessage>,
    wind: Option<bus_proto::WindMessage>,
    ruddersts: Option<bus_proto::RudderStsMessage>,
    ais: Vec<bus_proto::AisMessage>,
}

impl Mailbox {
    fn absorb(&mut self, msg: BusMessage) {
        match msg {
            BusMessage::Imu(m) => self.imu = Some(m),
            BusMessage::Wind(m) => self.wind = Some(m),
            BusMessage::RudderSts(m) => self.ruddersts = Some(m),
            BusMessage::Ais(m) => {
                self.ais.retain(|c| c.mmsi != m.mmsi);
                self.ais.push(m);
            }
            BusMessage::RudderCtl(_) | BusMessage::SkipperInput(_) => {
                // Published by this daemon itself / informational only; the
                // line bus echoes them back but they carry no new state.
            }
        }
    }

    fn ais_contacts(&self) -> Vec<sailcore::skipper::AisContact> {
        self.ais
            .iter()
            .map(|c| sailcore::skipper::AisContact {
                position: sailcore::LatLon::new(c.lat_deg, c.lng_deg),
                bearing_rad: c.cog_deg.to_radians(),
                speed_m_s: c.speed_m_s,
            })
            .collect()
    }

    fn to_controller_input(&self) -> ControllerInput {
        let mut input = ControllerInput::default();

        if let Some(imu) = &self.imu {
            input.imu.valid = !imu.lat_deg.is_nan();
            input.imu.latitude_deg = imu.lat_deg;
            input.imu.longitude_deg = imu.lng_deg;
            input.imu.altitude_m = imu.alt_m;
            input.imu.phi_z_rad = imu.yaw_deg.to_radians();
            input.imu.phi_x_rad = imu.roll_deg.to_radians();
            input.imu.phi_y_rad = imu.pitch_deg.to_radians();
            input.imu.velocity_x_m_s = imu.vel_x_m_s;
            input.imu.velocity_y_m_s = imu.vel_y_m_s;
            input.imu.velocity_z_m_s = imu.vel_z_m_s;
            input.imu.gyro_z_rad_s = imu.gyr_z_rad_s;
            input.imu.mag_x_au = imu.mag_x_au;
            input.imu.mag_y_au = imu.mag_y_au;
            input.imu.mag_z_au = imu.mag_z_au;
            input.imu.temperature_c = imu.temp_c;
        }

        if let Some(wind) = &self.wind {
            input.wind.valid = wind.valid && !wind.angle_deg.is_nan() && !wind.speed_m_s.is_nan();
            input.wind.angle_deg = wind.angle_deg;
            input.wind.mag_m_s = wind.speed_m_s;
        }

        if let Some(sts) = &self.ruddersts {
            input.drives.gamma_rudder_left_rad = sts.0.rudder_l_deg.to_radians();
            input.drives.gamma_rudder_right_rad = sts.0.rudder_r_deg.to_radians();
            input.drives.gamma_sail_rad = sts.0.sail_deg.to_radians();
            input.drives.rudder_left_homed = true;
            input.drives.rudder_right_homed = true;
            input.drives.sail_homed = true;
        }

        input
    }
}
