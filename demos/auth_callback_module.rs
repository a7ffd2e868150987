use futures::FutureExt;
use music_kit_rs::auth::{
    AuthorizationStatus, CallbackMusicModule, MusicKitAuth, NativeError, SubscriptionStatus,
};
use music_kit_rs::logger::{set_user_log_handler_fn, LogCallbackParams, LogLevel, LogOptions};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Print bridge failures as they are reported by the auth logger.
    set_user_log_handler_fn(
        Some(|params: LogCallbackParams| {
            eprintln!("[{}] {}: {}", params.level, params.logger_type, params.message);
        }),
        Some(LogOptions {
            level: Some(LogLevel::Error),
        }),
    );

    // Stand-ins for the platform binding. A real host forwards each closure to
    // the native music module and calls `done` from its completion handler.
    let module = CallbackMusicModule::new(
        |done| {
            done(AuthorizationStatus::Authorized);
            Ok(())
        },
        |done| {
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                done("signed-developer-token".to_string());
            });
            Ok(())
        },
        |developer_token, done| {
            let source = developer_token.as_deref().unwrap_or("native lookup");
            done(format!("music-user-token (minted with {source})"));
            Ok(())
        },
        || async { Err::<SubscriptionStatus, _>(NativeError::new("StoreKit unavailable")) }.boxed(),
    );

    let auth = MusicKitAuth::new(Arc::new(module));

    let status = auth.authorize().await?;
    println!("Authorization status: {}", status.as_str());

    let developer_token = auth.get_developer_token().await?;
    println!("Developer token: {developer_token}");

    // Served from the cache: the binding is not called a second time.
    let cached = auth.get_developer_token().await?;
    assert_eq!(cached, developer_token);

    let user_token = auth.get_music_user_token(&developer_token).await?;
    println!("Music user token: {user_token}");

    // The failing subscription query is logged and reported as "no access".
    let subscription = auth.check_subscription().await;
    println!(
        "Can play catalog content: {}",
        subscription.can_play_catalog_content
    );

    Ok(())
}
