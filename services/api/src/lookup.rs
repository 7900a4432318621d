use property_details::config::AppConfig;
use property_details::error::AppError;
use property_details::property::{HttpPropertyService, PropertyInfo};
use property_details::telemetry;

/// One-shot CLI lookup: pretty JSON on stdout, logs on stderr.
pub(crate) async fn run_lookup(address: &str) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let service = HttpPropertyService::from_config(&config.upstream)?;
    let info = service.lookup(address).await?;

    println!("{}", render_info(&info)?);
    Ok(())
}

fn render_info(info: &PropertyInfo) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(info)?)
}
