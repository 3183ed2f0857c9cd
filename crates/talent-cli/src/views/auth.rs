//! Login, registration and profile views.

use std::io::{self, Write};

use talent_models::{LoginForm, Profile, RegisterForm};
use talent_session::{SessionError, SessionStore};

use crate::commands::{LoginArgs, RegisterArgs};
use crate::notify::{write_form_errors, Notice};
use crate::views::Outcome;

pub async fn login<W: Write>(
    store: &SessionStore,
    args: LoginArgs,
    out: &mut W,
) -> io::Result<Outcome> {
    let request = match LoginForm::new(args.username, args.password.unwrap_or_default())
        .into_request()
    {
        Ok(request) => request,
        Err(e) => {
            write_form_errors(out, &e)?;
            return Ok(Outcome::Failed);
        }
    };

    match store.login(&request).await {
        Ok(profile) => {
            Notice::success("Signed in", format!("Welcome back, {}.", profile.name)).write_to(out)?;
            Ok(Outcome::Done)
        }
        Err(e) => write_session_error(out, "Login failed", &e),
    }
}

pub async fn register<W: Write>(
    store: &SessionStore,
    args: RegisterArgs,
    out: &mut W,
) -> io::Result<Outcome> {
    let form = RegisterForm {
        name: args.name,
        username: args.username,
        password: args.password.unwrap_or_default(),
        user_type: args.user_type,
        city: args.city,
        country: args.country,
    };
    let request = match form.into_request() {
        Ok(request) => request,
        Err(e) => {
            write_form_errors(out, &e)?;
            return Ok(Outcome::Failed);
        }
    };

    match store.register(&request).await {
        Ok(profile) => {
            Notice::success("Account created", format!("Welcome, {}.", profile.name))
                .write_to(out)?;
            Ok(Outcome::Done)
        }
        Err(e) => write_session_error(out, "Registration failed", &e),
    }
}

pub fn logout<W: Write>(store: &SessionStore, out: &mut W) -> io::Result<Outcome> {
    store.logout();
    Notice::success("Signed out", "Your saved session has been removed.").write_to(out)?;
    Ok(Outcome::Done)
}

pub fn whoami<W: Write>(store: &SessionStore, out: &mut W) -> io::Result<Outcome> {
    let session = store.session();
    match session.profile.as_ref().filter(|_| session.is_authenticated()) {
        Some(profile) => {
            write_profile(out, profile)?;
            Ok(Outcome::Done)
        }
        None => {
            writeln!(out, "Not signed in.")?;
            Ok(Outcome::Failed)
        }
    }
}

pub fn write_profile<W: Write>(out: &mut W, profile: &Profile) -> io::Result<()> {
    writeln!(out, "Name:     {}", profile.name)?;
    writeln!(out, "Email:    {}", profile.email)?;
    writeln!(out, "Account:  {}", profile.user_type)?;
    writeln!(out, "Location: {}", profile.location())?;
    Ok(())
}

fn write_session_error<W: Write>(
    out: &mut W,
    title: &str,
    err: &SessionError,
) -> io::Result<Outcome> {
    Notice::error(title, err.message()).write_to(out)?;
    Ok(Outcome::Failed)
}
