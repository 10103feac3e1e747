use dialoguer::{theme::ColorfulTheme, Confirm, Password};
use tracing::debug;

/// Everything the user should understand before agreeing.
const NOTICE: &str = "
You are about to delete everything in your Discord account.
This includes friends, channels or DMs and guilds. For more
information, please read the notes below.

Note 1: This will remove everything in your relationships. This
        includes friends, friend requests and blocked users.

Note 2: This does not clear messages you've sent in channels,
        nor does it remove them from Discord's database.

Note 3: This will delete guilds you own.

Note 4: The author of this program will never be responsible for
        any consequences of your actions. Proceed at your own risk.

Note 5: This will first delete all your friends, then your channels
        and finally your guilds.

This action is irreversible, thus it requires your verification.
";

/// Reads the user's token without echoing it.
///
/// Returns `None` if nothing usable was entered.
pub fn read_token() -> Option<String> {
    let token = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Token")
        .allow_empty_password(true)
        .interact();

    match token {
        Ok(token) => Some(token.trim().to_string()).filter(|token| !token.is_empty()),
        Err(error) => {
            debug!(%error, "unable to read token");
            None
        }
    }
}

/// Shows the notice and asks for a final go-ahead.
///
/// Anything but an explicit yes, including no input at all, is a no.
pub fn confirm_wipe() -> bool {
    println!("{NOTICE}");

    let answer = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Please verify")
        .default(false)
        .interact_opt();

    match answer {
        Ok(Some(answer)) => answer,
        Ok(None) => false,
        Err(error) => {
            debug!(%error, "unable to read confirmation");
            false
        }
    }
}
