use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 每一行 JSON 日誌都帶上的 span 名稱，收集端用它區分預約表單的流量
pub const BOOKING_SPAN: &str = "booking";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "em_booking=debug,info"
    } else {
        "em_booking=info"
    }
}

fn booking_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(booking_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Flat JSON lines; fields of the enclosing `booking` span (channel, endpoint)
/// are attached to every event so submissions can be grouped downstream.
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(booking_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_target(false),
        )
        .init();
}

/// Span wrapping one CLI run.
pub fn booking_span(channel: &str, page_origin: &str) -> tracing::Span {
    tracing::info_span!("booking", channel = channel, page_origin = page_origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_enables_crate_debug() {
        assert_eq!(default_directive(true), "em_booking=debug,info");
        assert_eq!(default_directive(false), "em_booking=info");
    }

    #[test]
    fn test_booking_span_carries_channel_fields() {
        let span = booking_span("cli", "http://localhost:5173");
        if let Some(meta) = span.metadata() {
            assert_eq!(meta.name(), BOOKING_SPAN);
            assert!(meta.fields().field("channel").is_some());
            assert!(meta.fields().field("page_origin").is_some());
        }
    }
}
