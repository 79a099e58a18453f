use flexi_logger::DeferredNow;
use log::{Level, Record};

/// `LEVEL [target] message`, with the timestamp only at debug and below.
pub fn cli_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    if record.level() >= Level::Debug {
        write!(
            w,
            "{} {:<5} [{}] {}",
            now.format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    } else {
        write!(w, "{:<5} {}", record.level(), record.args())
    }
}
