use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let admin = schoolhub_admin::build()?;

    let host = admin
        .ax
        .app
        .get("http.host")
        .unwrap_or_else(|| "127.0.0.1".to_string());

    let port = admin
        .ax
        .app
        .get("http.port")
        .unwrap_or_else(|| "3040".to_string());

    let addr = format!("{host}:{port}");
    let env = admin.ax.app.get("app.env").unwrap_or_default();
    tracing::info!(%addr, %env, "starting schoolhub-admin");

    admin.ax.listen(addr).await?;

    Ok(())
}
