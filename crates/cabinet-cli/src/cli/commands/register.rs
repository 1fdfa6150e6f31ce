//! Registration wizard.

use anyhow::Result;
use cabinet_core::api::types::RegisterForm;
use cabinet_core::flows::RegistrationFlow;

use super::{prompt_line, user_facing};
use crate::cli::App;

pub struct RegisterArgs {
    pub email: String,
    pub name: String,
    pub second_name: String,
    pub age: Option<u32>,
    pub phone: Option<String>,
}

pub async fn run(app: &App, args: RegisterArgs) -> Result<()> {
    let mut flow = RegistrationFlow::new(app.session.api());

    let sent = flow
        .send_verification_code(&args.email)
        .await
        .map_err(|e| user_facing(&e))?;
    println!("Verification code sent to {}", flow.state().email);
    if !sent.message.is_empty() {
        println!("  {}", sent.message);
    }

    let mut form = RegisterForm {
        email: String::new(),
        code: None,
        name: Some(args.name),
        second_name: Some(args.second_name),
        age: args.age,
        telefon_number: args.phone,
    };

    loop {
        let Some(input) = prompt_line("Enter verification code (or 'resend'): ")? else {
            anyhow::bail!("Registration cancelled: no verification code entered");
        };

        if input.eq_ignore_ascii_case("resend") {
            match flow.resend_verification_code().await {
                Ok(_) => println!("Code re-sent to {}", flow.state().email),
                Err(_) => eprintln!("✗ {}", flow.state().error.as_deref().unwrap_or_default()),
            }
            continue;
        }

        form.code = Some(input);
        match flow.verify_code_and_register(&form).await {
            Ok(response) => {
                println!("✓ Registered {}", response.user.display_name());
                if response.access_token.is_some() {
                    println!("  You are now logged in.");
                } else {
                    println!("  Run `cabinet login` to sign in.");
                }
                return Ok(());
            }
            Err(_) => eprintln!("✗ {}", flow.state().error.as_deref().unwrap_or_default()),
        }
    }
}
