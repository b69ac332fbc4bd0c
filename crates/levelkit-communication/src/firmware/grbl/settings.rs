//! Reading GRBL `$` settings over a controller channel

use std::collections::HashMap;
use std::time::Duration;

use levelkit_core::ProbeError;

use super::response_parser::{GrblResponse, GrblResponseParser};
use crate::communication::ControllerChannel;

/// Max rate for X (`$110`), used as the free-move feedrate
pub const FREE_MOVE_FEEDRATE_SETTING: u16 = 110;

/// Send `$$` and collect `$n=value` lines until `ok`
pub async fn read_settings<C>(
    channel: &mut C,
    timeout: Duration,
) -> Result<HashMap<u16, String>, ProbeError>
where
    C: ControllerChannel + ?Sized,
{
    const COMMAND: &str = "$$";

    let parser = GrblResponseParser::new();
    let mut settings = HashMap::new();
    channel.send_line(COMMAND).await?;

    loop {
        let line = match tokio::time::timeout(timeout, channel.next_line()).await {
            Err(_) => {
                return Err(ProbeError::Timeout {
                    command: COMMAND.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Ok(None) => return Err(ProbeError::ConnectionLost),
            Ok(Some(line)) => line,
        };

        match parser.parse(&line) {
            Some(GrblResponse::Setting { number, value }) => {
                settings.insert(number, value);
            }
            Some(GrblResponse::Ok) => break,
            Some(GrblResponse::Error(code)) => {
                return Err(ProbeError::ControllerError {
                    command: COMMAND.to_string(),
                    code,
                })
            }
            Some(GrblResponse::Alarm(code)) => return Err(ProbeError::Alarm { code }),
            _ => {}
        }
    }

    tracing::debug!("Read {} controller settings", settings.len());
    Ok(settings)
}

/// Read one numeric setting
///
/// `Ok(None)` when the controller does not report it or it is not a number.
pub async fn query_setting<C>(
    channel: &mut C,
    number: u16,
    timeout: Duration,
) -> Result<Option<f64>, ProbeError>
where
    C: ControllerChannel + ?Sized,
{
    let settings = read_settings(channel, timeout).await?;
    Ok(settings
        .get(&number)
        .and_then(|value| value.parse::<f64>().ok()))
}
