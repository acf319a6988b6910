use crate::commands::Context;
use crate::render;
use anyhow::{bail, Result};
use status_core::stream::EventStream;
use status_core::{HttpApi, StatusError, ViewCore};
use tracing::info;

fn redraw(ctx: &Context, core: &ViewCore<HttpApi>) -> Result<()> {
    if let Some(error) = &core.state.error {
        eprintln!("[error] {error}");
    }
    if ctx.json {
        let snapshot = serde_json::json!({
            "services": core.state.services,
            "incidents": core.state.incidents,
        });
        println!("{}", serde_json::to_string(&snapshot)?);
    } else {
        print!(
            "{}\n{}",
            render::services_table(&core.state.services),
            render::incidents_table(&core.state.incidents)
        );
    }
    Ok(())
}

/// Feeds stream messages to `core` until the connection fails or ends.
async fn follow(ctx: &Context, core: &mut ViewCore<HttpApi>, bearer: &str) -> StatusError {
    let mut stream = match EventStream::connect(&ctx.api, Some(bearer)).await {
        Ok(stream) => stream,
        Err(err) => return err,
    };
    loop {
        match stream.next_message().await {
            Ok(Some(data)) => {
                core.on_stream_message(&data).await;
                if let Err(err) = redraw(ctx, core) {
                    return StatusError::Stream(err.to_string());
                }
            }
            Ok(None) => return StatusError::Stream("server closed the stream".into()),
            Err(err) => return err,
        }
    }
}

/// Each pass of the outer loop is a full reload: fresh state, fresh token,
/// fresh connection. A failed stream waits out the reload delay first.
pub async fn run(ctx: &Context) -> Result<()> {
    if ctx.access.is_public() {
        bail!("watch needs an organization: pass --org or set STATUS_ORG_ID");
    }

    loop {
        let mut core = ctx.core();
        // Load errors are shown in the banner line; the stream still starts.
        let _ = core.load().await;
        redraw(ctx, &core)?;

        if !core.open_stream() {
            return Ok(());
        }
        let bearer = ctx.access.bearer().await?;

        let failure = tokio::select! {
            _ = tokio::signal::ctrl_c() => None,
            err = follow(ctx, &mut core, &bearer) => Some(err),
        };

        match failure {
            None => {
                core.close_stream();
                info!("stopped watching");
                return Ok(());
            }
            Some(err) => {
                let delay = core
                    .on_stream_error(&err)
                    .map_or(ctx.reload_delay, |directive| directive.after);
                tokio::time::sleep(delay).await;
            }
        }
    }
}
