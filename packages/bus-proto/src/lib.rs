//! Wire format for the line bus: space-separated `key:value` ASCII lines,
//! LF-terminated, capped at [`MAX_LINE_LEN`] bytes. One [`BusMessage`]
//! variant per message type the bus carries (`imu`, `wind`, `ruddersts`,
//! `rudderctl`, `skipper_input`, `ais`). This crate only encodes/decodes
//! lines; it knows nothing about the socket, subscriptions, or `$xoff`/`$id`
//! control messages, which are the broadcast daemon's concern, not the
//! core's.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The broadcast daemon refuses lines longer than this, LF included.
pub const MAX_LINE_LEN: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("line exceeds {MAX_LINE_LEN} bytes ({0} bytes)")]
    LineTooLong(usize),
    #[error("empty line")]
    EmptyLine,
    #[error("unknown message type {0:?}")]
    UnknownMessageType(String),
    #[error("missing field {0:?}")]
    MissingField(&'static str),
    #[error("field {field:?} has invalid value {value:?}")]
    InvalidField { field: &'static str, value: String },
}

pub type BusResult<T> = Result<T, BusError>;

fn parse_fields(rest: &str) -> HashMap<&str, &str> {
    rest.split_whitespace()
        .filter_map(|tok| tok.split_once(':'))
        .collect()
}

fn field_f64(fields: &HashMap<&str, &str>, name: &'static str) -> BusResult<f64> {
    let raw = fields.get(name).ok_or(BusError::MissingField(name))?;
    raw.parse::<f64>().map_err(|_| BusError::InvalidField { field: name, value: (*raw).to_string() })
}

fn field_i64(fields: &HashMap<&str, &str>, name: &'static str) -> BusResult<i64> {
    let raw = fields.get(name).ok_or(BusError::MissingField(name))?;
    raw.parse::<i64>().map_err(|_| BusError::InvalidField { field: name, value: (*raw).to_string() })
}

fn field_bool01(fields: &HashMap<&str, &str>, name: &'static str) -> BusResult<bool> {
    let raw = fields.get(name).ok_or(BusError::MissingField(name))?;
    match *raw {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(BusError::InvalidField { field: name, value: other.to_string() }),
    }
}

fn field_opt_f64(fields: &HashMap<&str, &str>, name: &'static str) -> Option<f64> {
    fields.get(name).and_then(|raw| raw.parse::<f64>().ok())
}

fn field_opt_i64(fields: &HashMap<&str, &str>, name: &'static str) -> Option<i64> {
    fields.get(name).and_then(|raw| raw.parse::<i64>().ok())
}

fn field_opt_str(fields: &HashMap<&str, &str>, name: &'static str) -> Option<String> {
    fields.get(name).map(|s| s.to_string())
}

/// Splits `"tag: rest"` into `(tag, rest)`. The tag's trailing colon is part
/// of the wire format, not a `key:value` pair.
fn split_tag(line: &str) -> BusResult<(&str, &str)> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(BusError::EmptyLine);
    }
    let mut parts = line.splitn(2, char::is_whitespace);
    let tag = parts.next().unwrap_or("").trim_end_matches(':');
    let rest = parts.next().unwrap_or("");
    Ok((tag, rest))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuMessage {
    pub timestamp_ms: i64,
    pub temp_c: f64,
    pub acc_x_m_s2: f64,
    pub acc_y_m_s2: f64,
    pub acc_z_m_s2: f64,
    pub gyr_x_rad_s: f64,
    pub gyr_y_rad_s: f64,
    pub gyr_z_rad_s: f64,
    pub mag_x_au: f64,
    pub mag_y_au: f64,
    pub mag_z_au: f64,
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
    pub lat_deg: f64,
    pub lng_deg: f64,
    pub alt_m: f64,
    pub vel_x_m_s: f64,
    pub vel_y_m_s: f64,
    pub vel_z_m_s: f64,
}

impl FromStr for ImuMessage {
    type Err = BusError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (tag, rest) = split_tag(line)?;
        if tag != "imu" {
            return Err(BusError::UnknownMessageType(tag.to_string()));
        }
        let f = parse_fields(rest);
        Ok(ImuMessage {
            timestamp_ms: field_i64(&f, "timestamp_ms")?,
            temp_c: field_f64(&f, "temp_c")?,
            acc_x_m_s2: field_f64(&f, "acc_x_m_s2")?,
            acc_y_m_s2: field_f64(&f, "acc_y_m_s2")?,
            acc_z_m_s2: field_f64(&f, "acc_z_m_s2")?,
            gyr_x_rad_s: field_f64(&f, "gyr_x_rad_s")?,
            gyr_y_rad_s: field_f64(&f, "gyr_y_rad_s")?,
            gyr_z_rad_s: field_f64(&f, "gyr_z_rad_s")?,
            mag_x_au: field_f64(&f, "mag_x_au")?,
            mag_y_au: field_f64(&f, "mag_y_au")?,
            mag_z_au: field_f64(&f, "mag_z_au")?,
            roll_deg: field_f64(&f, "roll_deg")?,
            pitch_deg: field_f64(&f, "pitch_deg")?,
            yaw_deg: field_f64(&f, "yaw_deg")?,
            lat_deg: field_f64(&f, "lat_deg")?,
            lng_deg: field_f64(&f, "lng_deg")?,
            alt_m: field_f64(&f, "alt_m")?,
            vel_x_m_s: field_f64(&f, "vel_x_m_s")?,
            vel_y_m_s: field_f64(&f, "vel_y_m_s")?,
            vel_z_m_s: field_f64(&f, "vel_z_m_s")?,
        })
    }
}

impl fmt::Display for ImuMessage {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "imu: timestamp_ms:{} temp_c:{} acc_x_m_s2:{} acc_y_m_s2:{} acc_z_m_s2:{} gyr_x_rad_s:{} gyr_y_rad_s:{} gyr_z_rad_s:{} mag_x_au:{} mag_y_au:{} mag_z_au:{} roll_deg:{} pitch_deg:{} yaw_deg:{} lat_deg:{} lng_deg:{} alt_m:{} vel_x_m_s:{} vel_y_m_s:{} vel_z_m_s:{}",
            self.timestamp_ms,
            self.temp_c,
            self.acc_x_m_s2,
            self.acc_y_m_s2,
            self.acc_z_m_s2,
            self.gyr_x_rad_s,
            self.gyr_y_rad_s,
            self.gyr_z_rad_s,
            self.mag_x_au,
            self.mag_y_au,
            self.mag_z_au,
            self.roll_deg,
            self.pitch_deg,
            self.yaw_deg,
            self.lat_deg,
            self.lng_deg,
            self.alt_m,
            self.vel_x_m_s,
            self.vel_y_m_s,
            self.vel_z_m_s,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindMessage {
    pub timestamp_ms: i64,
    pub angle_deg: f64,
    pub speed_m_s: f64,
    pub valid: bool,
}

impl FromStr for WindMessage {
    type Err = BusError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (tag, rest) = split_tag(line)?;
        if tag != "wind" {
            return Err(BusError::UnknownMessageType(tag.to_string()));
        }
        let f = parse_fields(rest);
        Ok(WindMessage {
            timestamp_ms: field_i64(&f, "timestamp_ms")?,
            angle_deg: field_f64(&f, "angle_deg")?,
            speed_m_s: field_f64(&f, "speed_m_s")?,
            valid: field_bool01(&f, "valid")?,
        })
    }
}

impl fmt::Display for WindMessage {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "wind: timestamp_ms:{} angle_deg:{} speed_m_s:{} valid:{}",
            self.timestamp_ms,
            self.angle_deg,
            self.speed_m_s,
            self.valid as u8,
        )
    }
}

/// `ruddersts` (actual drive angles, published by the daemon) and
/// `rudderctl` (commanded drive angles, published to the daemon) share a
/// field layout; only the tag differs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RudderAngles {
    pub timestamp_ms: i64,
    pub rudder_l_deg: f64,
    pub rudder_r_deg: f64,
    pub sail_deg: f64,
}

impl RudderAngles {
    fn parse_tagged(line: &str, expected_tag: &str) -> BusResult<Self> {
        let (tag, rest) = split_tag(line)?;
        if tag != expected_tag {
            return Err(BusError::UnknownMessageType(tag.to_string()));
        }
        let f = parse_fields(rest);
        Ok(RudderAngles {
            timestamp_ms: field_i64(&f, "timestamp_ms")?,
            rudder_l_deg: field_f64(&f, "rudder_l_deg")?,
            rudder_r_deg: field_f64(&f, "rudder_r_deg")?,
            sail_deg: field_f64(&f, "sail_deg")?,
        })
    }

    fn format_tagged(&self, tag: &str, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "{tag}: timestamp_ms:{} rudder_l_deg:{} rudder_r_deg:{} sail_deg:{}",
            self.timestamp_ms, self.rudder_l_deg, self.rudder_r_deg, self.sail_deg,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RudderStsMessage(pub RudderAngles);

impl FromStr for RudderStsMessage {
    type Err = BusError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        RudderAngles::parse_tagged(line, "ruddersts").map(RudderStsMessage)
    }
}

impl fmt::Display for RudderStsMessage {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.format_tagged("ruddersts", out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RudderCtlMessage(pub RudderAngles);

impl FromStr for RudderCtlMessage {
    type Err = BusError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        RudderAngles::parse_tagged(line, "rudderctl").map(RudderCtlMessage)
    }
}

impl fmt::Display for RudderCtlMessage {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.format_tagged("rudderctl", out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipperInputMessage {
    pub timestamp_ms: i64,
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub angle_true_deg: f64,
    pub mag_true_kn: f64,
}

impl FromStr for SkipperInputMessage {
    type Err = BusError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (tag, rest) = split_tag(line)?;
        if tag != "skipper_input" {
            return Err(BusError::UnknownMessageType(tag.to_string()));
        }
        let f = parse_fields(rest);
        Ok(SkipperInputMessage {
            timestamp_ms: field_i64(&f, "timestamp_ms")?,
            longitude_deg: field_f64(&f, "longitude_deg")?,
            latitude_deg: field_f64(&f, "latitude_deg")?,
            angle_true_deg: field_f64(&f, "angle_true_deg")?,
            mag_true_kn: field_f64(&f, "mag_true_kn")?,
        })
    }
}

impl fmt::Display for SkipperInputMessage {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "skipper_input: timestamp_ms:{} longitude_deg:{} latitude_deg:{} angle_true_deg:{} mag_true_kn:{}",
            self.timestamp_ms, self.longitude_deg, self.latitude_deg, self.angle_true_deg, self.mag_true_kn,
        )
    }
}

/// `ais`. `heading_deg`, `status`, and `shipname` are optional per spec;
/// absent fields decode to `None` rather than erroring.
#[derive(Debug, Clone, PartialEq)]
pub struct AisMessage {
    pub timestamp_ms: i64,
    pub mmsi: i64,
    pub msgtype: i64,
    pub speed_m_s: f64,
    pub lat_deg: f64,
    pub lng_deg: f64,
    pub cog_deg: f64,
    pub heading_deg: Option<f64>,
    pub status: Option<i64>,
    pub shipname: Option<String>,
}

impl FromStr for AisMessage {
    type Err = BusError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (tag, rest) = split_tag(line)?;
        if tag != "ais" {
            return Err(BusError::UnknownMessageType(tag.to_string()));
        }
        let f = parse_fields(rest);
        Ok(AisMessage {
            timestamp_ms: field_i64(&f, "timestamp_ms")?,
            mmsi: field_i64(&f, "mmsi")?,
            msgtype: field_i64(&f, "msgtype")?,
            speed_m_s: field_f64(&f, "speed_m_s")?,
            lat_deg: field_f64(&f, "lat_deg")?,
            lng_deg: field_f64(&f, "lng_deg")?,
            cog_deg: field_f64(&f, "cog_deg")?,
            heading_deg: field_opt_f64(&f, "heading_deg"),
            status: field_opt_i64(&f, "status"),
            shipname: field_opt_str(&f, "shipname"),
        })
    }
}

impl fmt::Display for AisMessage {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "ais: timestamp_ms:{} mmsi:{} msgtype:{} speed_m_s:{} lat_deg:{} lng_deg:{} cog_deg:{}",
            self.timestamp_ms, self.mmsi, self.msgtype, self.speed_m_s, self.lat_deg, self.lng_deg, self.cog_deg,
        )?;
        if let Some(h) = self.heading_deg {
            write!(out, " heading_deg:{h}")?;
        }
        if let Some(s) = self.status {
            write!(out, " status:{s}")?;
        }
        if let Some(name) = &self.shipname {
            write!(out, " shipname:{name}")?;
        }
        Ok(())
    }
}

/// Any line the bus can carry, dispatched on its leading type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum BusMessage {
    Imu(ImuMessage),
    Wind(WindMessage),
    RudderSts(RudderStsMessage),
    RudderCtl(RudderCtlMessage),
    SkipperInput(SkipperInputMessage),
    Ais(AisMessage),
}

impl FromStr for BusMessage {
    type Err = BusError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if line.len() > MAX_LINE_LEN {
            return Err(BusError::LineTooLong(line.len()));
        }
        let (tag, _) = split_tag(line)?;
        match tag {
            "imu" => Ok(BusMessage::Imu(line.parse()?)),
            "wind" => Ok(BusMessage::Wind(line.parse()?)),
            "ruddersts" => Ok(BusMessage::RudderSts(line.parse()?)),
            "rudderctl" => Ok(BusMessage::RudderCtl(line.parse()?)),
            "skipper_input" => Ok(BusMessage::SkipperInput(line.parse()?)),
            "ais" => Ok(BusMessage::Ais(line.parse()?)),
            other => Err(BusError::UnknownMessageType(other.to_string())),
        }
    }
}

impl fmt::Display for BusMessage {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusMessage::Imu(m) => write!(out, "{m}"),
            BusMessage::Wind(m) => write!(out, "{m}"),
            BusMessage::RudderSts(m) => write!(out, "{m}"),
            BusMessage::RudderCtl(m) => write!(out, "{m}"),
            BusMessage::SkipperInput(m) => write!(out, "{m}"),
            BusMessage::Ais(m) => write!(out, "{m}"),
        }
    }
}

/// Encodes `msg` as a bus line, LF-terminated, erroring rather than
/// silently truncating if the result would exceed [`MAX_LINE_LEN`].
pub fn encode_line(msg: &BusMessage) -> BusResult<String> {
    let mut line = msg.to_string();
    line.push('\n');
    if line.len() > MAX_LINE_LEN {
        return Err(BusError::LineTooLong(line.len()));
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imu_round_trips_through_display_and_parse() {
        let msg = ImuMessage {
            timestamp_ms: 1234,
            temp_c: 18.5,
            acc_x_m_s2: 0.1,
            acc_y_m_s2: 0.2,
            acc_z_m_s2: 9.8,
            gyr_x_rad_s: 0.0,
            gyr_y_rad_s: 0.0,
            gyr_z_rad_s: 0.01,
            mag_x_au: 0.3,
            mag_y_au: 0.4,
            mag_z_au: 0.5,
            roll_deg: 1.0,
            pitch_deg: 2.0,
            yaw_deg: 90.0,
            lat_deg: 47.0,
            lng_deg: 8.0,
            alt_m: 400.0,
            vel_x_m_s: 1.5,
            vel_y_m_s: 0.0,
            vel_z_m_s: 0.0,
        };
        let line = msg.to_string();
        let parsed: ImuMessage = line.parse().unwrap();
        assert_eq!(msg, parsed);
    }

    #[test]
    fn wind_message_accepts_nan_for_not_measured() {
        let line = "wind: timestamp_ms:1 angle_deg:nan speed_m_s:nan valid:0";
        let parsed: WindMessage = line.parse().unwrap();
        assert!(parsed.angle_deg.is_nan());
        assert!(!parsed.valid);
    }

    #[test]
    fn ais_message_tolerates_missing_optional_fields() {
        let line = "ais: timestamp_ms:1 mmsi:123456789 msgtype:1 speed_m_s:5.0 lat_deg:47.0 lng_deg:8.0 cog_deg:90.0";
        let parsed: AisMessage = line.parse().unwrap();
        assert_eq!(parsed.heading_deg, None);
        assert_eq!(parsed.shipname, None);
    }

    #[test]
    fn ais_message_round_trips_optional_fields() {
        let msg = AisMessage {
            timestamp_ms: 1,
            mmsi: 123456789,
            msgtype: 1,
            speed_m_s: 5.0,
            lat_deg: 47.0,
            lng_deg: 8.0,
            cog_deg: 90.0,
            heading_deg: Some(91.0),
            status: Some(0),
            shipname: Some("TESTSHIP".to_string()),
        };
        let line = msg.to_string();
        let parsed: AisMessage = line.parse().unwrap();
        assert_eq!(msg, parsed);
    }

    #[test]
    fn bus_message_dispatches_on_tag() {
        let line = "rudderctl: timestamp_ms:1 rudder_l_deg:2.0 rudder_r_deg:2.0 sail_deg:45.0";
        match line.parse::<BusMessage>().unwrap() {
            BusMessage::RudderCtl(m) => assert_eq!(m.0.sail_deg, 45.0),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "frobnicate: x:1".parse::<BusMessage>().unwrap_err();
        assert!(matches!(err, BusError::UnknownMessageType(_)));
    }

    #[test]
    fn oversized_line_is_rejected() {
        let huge = format!("wind: timestamp_ms:1 angle_deg:1.0 speed_m_s:1.0 valid:1 {}", "x".repeat(2000));
        let err = huge.parse::<BusMessage>().unwrap_err();
        assert!(matches!(err, BusError::LineTooLong(_)));
    }

    #[test]
    fn encode_line_is_lf_terminated() {
        let msg = BusMessage::Wind(WindMessage { timestamp_ms: 1, angle_deg: 10.0, speed_m_s: 5.0, valid: true });
        let line = encode_line(&msg).unwrap();
        assert!(line.ends_with('\n'));
    }
}
