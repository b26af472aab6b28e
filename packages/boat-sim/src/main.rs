mod boat_sim;
mod bus_client;
mod scenarios;

use std::path::PathBuf;

use bus_client::BusClient;
use bus_proto::{AisMessage, BusMessage, ImuMessage, RudderAngles, RudderCtlMessage, WindMessage};
use clap::Parser;
use scenarios::Scenario;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

/// Single-vessel boat/wind/AIS simulator: speaks the same line bus as the
/// real boat's sensor drivers, so `helmsman-daemon` can be driven through a
/// named scenario without hardware in the loop.
#[derive(Parser, Debug)]
#[command(name = "boat-sim")]
struct Args {
    /// Unix-domain socket of the line bus.
    socket: PathBuf,

    /// Which named scenario to start from.
    #[arg(long, default_value = "becalmed")]
    scenario: String,

    /// Simulation speed multiplier (2.0 runs the physics twice as fast as
    /// wall clock); useful for soak-testing a long plan quickly.
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Verbose logging (debug-level tracing instead of info).
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "boat_sim=debug" } else { "boat_sim=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let scenario = Scenario::parse(&args.scenario).ok_or_else(|| {
        anyhow::anyhow!("unknown scenario {:?}; choices are {:?}", args.scenario, Scenario::names())
    })?;
    let mut sim = scenario.build();
    info!("boat-sim starting scenario={:?} socket={}", args.scenario, args.socket.display());

    let (message_tx, mut message_rx) = mpsc::channel::<BusMessage>(256);
    let bus = BusClient::connect(&args.socket, message_tx).await?;

    let mut rng = rand::thread_rng();
    let dt_s = 0.1 * args.speed;
    let tick_ms = (100.0 / args.speed).max(1.0) as u64;
    let mut ticker = interval(Duration::from_millis(tick_ms));
    let mut timestamp_ms: i64 = 0;

    loop {
        ticker.tick().await;
        timestamp_ms += (dt_s * 1000.0) as i64;

        while let Ok(msg) = message_rx.try_recv() {
            if let BusMessage::RudderCtl(RudderCtlMessage(cmd)) = msg {
                sim.command(cmd.rudder_l_deg.to_radians(), cmd.rudder_r_deg.to_radians(), cmd.sail_deg.to_radians());
            }
        }

        sim.tick(dt_s);
        publish_samples(&bus, &sim, &mut rng, timestamp_ms);
    }
}

fn publish_samples(bus: &BusClient, sim: &boat_sim::BoatSim, rng: &mut impl rand::Rng, timestamp_ms: i64) {
    let (app_angle_rad, app_mag) = sim.apparent_wind(rng);
    let (heel_rad, pitch_rad) = sim.heel_pitch_rad();

    bus.publish(&BusMessage::Imu(ImuMessage {
        timestamp_ms,
        temp_c: 18.0,
        acc_x_m_s2: 0.0,
        acc_y_m_s2: 0.0,
        acc_z_m_s2: 9.81,
        gyr_x_rad_s: 0.0,
        gyr_y_rad_s: 0.0,
        gyr_z_rad_s: sim.yaw_rate_rad_s,
        mag_x_au: sim.heading_rad.cos(),
        mag_y_au: sim.heading_rad.sin(),
        mag_z_au: 0.0,
        roll_deg: heel_rad.to_degrees(),
        pitch_deg: pitch_rad.to_degrees(),
        yaw_deg: sim.heading_rad.to_degrees(),
        lat_deg: sim.position.lat_deg(),
        lng_deg: sim.position.lon_deg(),
        alt_m: 0.0,
        vel_x_m_s: sim.boat_speed_m_s * sim.heading_rad.cos(),
        vel_y_m_s: sim.boat_speed_m_s * sim.heading_rad.sin(),
        vel_z_m_s: 0.0,
    }));

    bus.publish(&BusMessage::Wind(WindMessage {
        timestamp_ms,
        angle_deg: app_angle_rad.to_degrees(),
        speed_m_s: app_mag,
        valid: true,
    }));

    bus.publish(&BusMessage::RudderSts(bus_proto::RudderStsMessage(RudderAngles {
        timestamp_ms,
        rudder_l_deg: sim.gamma_rudder_left_actual_rad.to_degrees(),
        rudder_r_deg: sim.gamma_rudder_right_actual_rad.to_degrees(),
        sail_deg: sim.gamma_sail_actual_rad.to_degrees(),
    })));

    for track in &sim.ais_tracks {
        bus.publish(&BusMessage::Ais(AisMessage {
            timestamp_ms,
            mmsi: track.mmsi,
            msgtype: 1,
            speed_m_s: track.speed_m_s,
            lat_deg: track.position.lat_deg(),
            lng_deg: track.position.lon_deg(),
            cog_deg: track.bearing_rad.to_degrees(),
            heading_deg: Some(track.bearing_rad.to_degrees()),
            status: Some(0),
            shipname: None,
        }));
    }

    debug!("tick published: heading={:.1} speed={:.2}", sim.heading_rad.to_degrees(), sim.boat_speed_m_s);
}
