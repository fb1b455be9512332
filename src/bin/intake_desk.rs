//! Rental desk front-end for the intake wizard.
//!
//! Walks staff through the same two screens as the web form against a
//! running intake service.

use clap::Parser;
use pats_peak_intake::wizard::{
    match_meta, results_status, FieldMessages, FittingForm, HttpIntakeApi, LookupForm,
    LookupOutcome, Screen, SubmitOutcome, WizardController, WizardSession,
};
use std::time::Duration;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "intake-desk", about = "Guest intake at the rental desk")]
struct Args {
    /// Base URL of the intake service
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,

    /// Seconds to wait for each call
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,
}

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let api = HttpIntakeApi::new(&args.server, Duration::from_secs(args.timeout_secs))?;
    let controller = WizardController::new(api);
    let mut input = BufReader::new(io::stdin()).lines();
    let mut session = WizardSession::new();

    println!("Pats Peak rental intake ({}). Ctrl-D to quit.", args.server);

    loop {
        session = match session.screen() {
            Screen::Lookup => match lookup_screen(&controller, &session, &mut input).await? {
                Some(next) => next,
                None => return Ok(()),
            },
            Screen::Fitting => match fitting_screen(&controller, &session, &mut input).await? {
                Some(next) => next,
                None => return Ok(()),
            },
        };
    }
}

/// Read one answer; `None` at end of input. An empty answer keeps `default`.
async fn ask(input: &mut Input, label: &str, default: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    if default.is_empty() {
        stdout.write_all(format!("{}: ", label).as_bytes()).await?;
    } else {
        stdout.write_all(format!("{} [{}]: ", label, default).as_bytes()).await?;
    }
    stdout.flush().await?;

    Ok(input.next_line().await?.map(|line| {
        let line = line.trim().to_string();
        if line.is_empty() { default.to_string() } else { line }
    }))
}

fn print_messages(messages: &FieldMessages) {
    for (field, message) in messages.iter() {
        println!("  {}: {}", field, message);
    }
}

async fn lookup_screen(
    controller: &WizardController<HttpIntakeApi>,
    session: &WizardSession,
    input: &mut Input,
) -> io::Result<Option<WizardSession>> {
    println!("\n== Step 1: find guest ==");
    let previous = session.identity().map(LookupForm::from_identity).unwrap_or_default();

    let mut form = LookupForm::default();
    for (label, current, slot) in [
        ("First name", &previous.first_name, &mut form.first_name),
        ("Last name", &previous.last_name, &mut form.last_name),
        ("Date of birth (YYYY-MM-DD)", &previous.dob, &mut form.dob),
        ("ZIP", &previous.zip, &mut form.zip),
        ("Phone", &previous.phone, &mut form.phone),
    ] {
        match ask(input, label, current).await? {
            Some(answer) => *slot = answer,
            None => return Ok(None),
        }
    }

    println!("Searching…");
    let found = match controller.submit_lookup(session, &form).await {
        LookupOutcome::Found(found) => found,
        LookupOutcome::Invalid(messages) => {
            print_messages(&messages);
            return Ok(Some(session.clone()));
        }
        LookupOutcome::Failed(message) => {
            println!("  {}", message);
            return Ok(Some(session.clone()));
        }
        LookupOutcome::Blocked | LookupOutcome::Busy => return Ok(Some(session.clone())),
    };

    for (index, guest) in found.matches().iter().enumerate() {
        println!("  {}) {} {} | {}", index + 1, guest.first_name, guest.last_name, match_meta(guest));
    }
    println!("{}", results_status(found.matches()));

    loop {
        let Some(choice) = ask(input, "Number to select, n for new guest, r to search again", "n").await? else {
            return Ok(None);
        };
        let next = match choice.as_str() {
            "r" => return Ok(Some(found.back())),
            "n" => found.continue_as_new(),
            number => match number.parse::<usize>() {
                Ok(n) if n >= 1 => found.select(n - 1),
                _ => continue,
            },
        };
        match next {
            Ok(next) => return Ok(Some(next)),
            Err(e) => println!("  {}", e),
        }
    }
}

async fn fitting_screen(
    controller: &WizardController<HttpIntakeApi>,
    session: &WizardSession,
    input: &mut Input,
) -> io::Result<Option<WizardSession>> {
    println!("\n== Step 2: fitting details ==");
    if let Some(summary) = session.summary_line() {
        println!("{}", summary);
    }
    let prefill_email = session
        .carried_fields()
        .and_then(|carried| carried.email)
        .unwrap_or_default();

    let Some(skier_type) = ask(input, "Skier type (I, II, III; b to go back)", "").await? else {
        return Ok(None);
    };
    if skier_type.eq_ignore_ascii_case("b") {
        return Ok(Some(session.back()));
    }

    let mut form = FittingForm {
        skier_type: skier_type.to_ascii_uppercase(),
        ..FittingForm::default()
    };
    for (label, default, slot) in [
        ("Weight (lbs)", "", &mut form.weight_lbs),
        ("Height (in)", "", &mut form.height_in),
        ("Shoe size (US)", "", &mut form.shoe_size),
        ("Email", prefill_email.as_str(), &mut form.email),
    ] {
        match ask(input, label, default).await? {
            Some(answer) => *slot = answer,
            None => return Ok(None),
        }
    }
    let Some(consent) = ask(input, "Guest agrees to the rental terms (y/n)", "n").await? else {
        return Ok(None);
    };
    form.consent = consent.eq_ignore_ascii_case("y");

    println!("Submitting…");
    match controller.submit_fitting(session, &form).await {
        SubmitOutcome::Submitted { reference, session } => {
            println!(
                "Thanks! Your information has been received. (ref: {})",
                reference.as_deref().unwrap_or("none")
            );
            Ok(Some(session))
        }
        SubmitOutcome::Invalid(messages) => {
            print_messages(&messages);
            Ok(Some(session.clone()))
        }
        SubmitOutcome::Failed(message) => {
            println!("  {}", message);
            Ok(Some(session.clone()))
        }
        SubmitOutcome::NotReady | SubmitOutcome::Busy => Ok(Some(session.back())),
    }
}
