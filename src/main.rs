use std::env;

use poise::serenity_prelude::{self as serenity};
use rolewarden::settings::{self, BotSettings, SettingsSource};
use rolewarden::{BOT_NAME, Data, Error, commands, handlers, logging};
use serenity::GatewayIntents;
use tracing::info;

/// Main function to run the bot
async fn async_main() -> Result<(), Error> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let lookup = |key: &str| env::var(key).ok();
    let settings_path = BotSettings::path(lookup);
    let (settings, source) = BotSettings::load(&settings_path, lookup)?;

    logging::init(&settings.log_dir)?;
    match source {
        SettingsSource::File => info!("Loaded settings from {}", settings_path.display()),
        SettingsSource::Defaults => {
            info!("No settings file at {}, using defaults", settings_path.display());
        }
    }
    if settings.owner_id.is_none() {
        info!("No owner configured, the config command is disabled");
    }

    let token = settings::discord_token(lookup)?;
    let prefix = settings.prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            pre_command: |ctx| Box::pin(logging::log_command_start(ctx)),
            post_command: |ctx| Box::pin(logging::log_command_end(ctx)),
            on_error: |error| Box::pin(commands::on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                logging::log_console(&format!(
                    "Registering {} commands for {}",
                    framework.options().commands.len(),
                    ready.user.name
                ));
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(Data::new(settings, ctx.http.clone()))
            })
        })
        .build();

    // Member roles are needed for the moderator role check
    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;
    let mut client = serenity::ClientBuilder::new(token, intents)
        .event_handler(handlers::Handler)
        .framework(framework)
        .await?;

    info!("Starting {BOT_NAME}...");
    client.start().await?;

    Ok(())
}

fn main() {
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Error::from)
        .and_then(|runtime| runtime.block_on(async_main()));

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
