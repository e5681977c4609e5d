use log::Level;
use serde_json::{json, Value};

/// Emit one structured diagnostic record through the `log` facade.
///
/// The record body is a single JSON object so that any subscriber can index
/// it by `code` and `module` without parsing free text.
pub fn log_event(
    level: Level,
    code: Option<&str>,
    module: &str,
    message: &str,
    explain: Option<&str>,
    data: Option<Value>,
) {
    if !log::log_enabled!(target: "chaitanya", level) {
        return;
    }
    let record = json!({
        "code": code,
        "module": module,
        "message": message,
        "explain": explain,
        "data": data,
    });
    log::log!(target: "chaitanya", level, "{record}");
}

/// Shorten free text for log previews.
pub(crate) fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(preview(&long).chars().count(), 200);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn log_event_without_logger_is_silent() {
        log_event(Level::Info, Some("GEN-0200"), "genai", "ok", None, None);
    }
}
