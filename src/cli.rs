//! CLI front-end — interactive stdin/stdout wizard.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::profile::{Persona, PersonaAnswers};
use crate::recommend::Requester;
use crate::wizard::{ChatReply, INITIAL_QUESTIONS, IntakeAnswers, Session, followup_questions};

const RULE_WIDTH: usize = 100;

/// Run the full interactive wizard against stdin/stdout.
pub async fn run(requester: &Requester) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = Session::new();

    print_banner();
    session.begin()?;

    let answers = ask_intake(&mut lines).await?;
    session.submit_intake(&answers)?;

    let persona = ask_persona(&mut lines).await?;
    session.select_persona(persona)?;
    println!("\n[Persona Identified: {persona}]");

    // A failed generation returns to the follow-up questions, so both run
    // in one loop until the request succeeds.
    loop {
        let followup = ask_followup(&mut lines, persona).await?;
        session.submit_followup(followup)?;

        println!("\n[Analyzing customer requirements across all knowledge sources...]");
        println!("[Applying persona-specific prioritization logic...]");
        match session.generate(requester).await {
            Ok(()) => break,
            Err(e) => {
                eprintln!("\n{e}");
                eprintln!("Let's adjust the follow-up answers and try again.");
            }
        }
    }

    print_summary(&session);
    print_chat_help();

    loop {
        let input = prompt(&mut lines, "\nYour input: ").await?;
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("done") {
            println!("\nThank you for using the Free Zone Sales Assistant!");
            break;
        }

        match session.chat(requester, &input).await? {
            ChatReply::Refreshed => print_summary(&session),
            ChatReply::ProfileUpdated => {
                println!(
                    "Type 'refresh' to see updated recommendations, or continue asking questions."
                );
            }
            ChatReply::Answer(answer) => println!("\nAnswer: {answer}"),
            ChatReply::Failed(message) => eprintln!("\n{message}"),
        }
    }

    Ok(())
}

fn print_banner() {
    let line = "=".repeat(RULE_WIDTH);
    println!("\n{line}");
    println!("{:^width$}", "FREE ZONE SALES ASSISTANT", width = RULE_WIDTH);
    println!("{line}");
    println!("\nI'll help you identify the best business activities for your customer.");
    println!("Let's start by gathering some information.");
}

async fn ask_intake(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<IntakeAnswers> {
    let mut collected = Vec::with_capacity(INITIAL_QUESTIONS.len());
    for (i, question) in INITIAL_QUESTIONS.iter().enumerate() {
        println!("\nQ{}: {question}", i + 1);
        collected.push(ask_required(lines).await?);
    }
    let mut answers = collected.into_iter();
    // One answer per question, in question order.
    Ok(IntakeAnswers {
        shareholders: answers.next().unwrap_or_default(),
        visas: answers.next().unwrap_or_default(),
        business: answers.next().unwrap_or_default(),
        experience: answers.next().unwrap_or_default(),
        flexibility: answers.next().unwrap_or_default(),
        purpose: answers.next().unwrap_or_default(),
        timeline: answers.next().unwrap_or_default(),
    })
}

async fn ask_persona(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Persona> {
    println!("\nQ8: Which persona best fits this customer?");
    println!("  a. Residential (visa/residency focused)");
    println!("  b. Business (genuine entrepreneur)");
    println!("  c. Finance (banking/tax optimization)");
    let choice = prompt(lines, "Select (a/b/c): ").await?;
    Ok(match choice.to_lowercase().as_str() {
        "a" => Persona::Residential,
        "b" => Persona::Business,
        "c" => Persona::Finance,
        _ => {
            println!("Invalid choice. Defaulting to Business persona.");
            Persona::Business
        }
    })
}

async fn ask_followup(
    lines: &mut Lines<BufReader<Stdin>>,
    persona: Persona,
) -> anyhow::Result<PersonaAnswers> {
    println!(
        "\n--- {} PERSONA FOLLOW-UP QUESTIONS ---",
        persona.to_string().to_uppercase()
    );
    let questions = followup_questions(persona);
    let mut collected = Vec::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        println!("\nQ{}: {question}", i + 1);
        collected.push(ask_required(lines).await?);
    }
    let mut answers = collected.into_iter();
    Ok(match persona {
        Persona::Residential => PersonaAnswers::Residential {
            dependents: answers.next().unwrap_or_default(),
            residency_plan: answers.next().unwrap_or_default(),
        },
        Persona::Business => PersonaAnswers::Business {
            business_model: answers.next().unwrap_or_default(),
        },
        Persona::Finance => PersonaAnswers::Finance {
            invoicing: answers.next().unwrap_or_default(),
            bank_purpose: answers.next().unwrap_or_default(),
            tax_strategy: answers.next().unwrap_or_default(),
        },
    })
}

/// Prompt until the user gives a non-empty answer.
async fn ask_required(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<String> {
    loop {
        let answer = prompt(lines, "Answer: ").await?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        println!("An answer is required to continue.");
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> anyhow::Result<String> {
    print!("{text}");
    std::io::stdout().flush()?;
    match lines.next_line().await? {
        Some(line) => Ok(line.trim().to_string()),
        None => anyhow::bail!("stdin closed"),
    }
}

fn print_summary(session: &Session) {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "─".repeat(RULE_WIDTH);

    println!("\n{heavy}");
    println!(
        "{:^width$}",
        "CUSTOMER SUMMARY & RECOMMENDATIONS",
        width = RULE_WIDTH
    );
    println!("{heavy}");

    println!("\n{light}");
    println!("TABLE 1: CUSTOMER PROFILE");
    println!("{light}");
    println!("\n{:<30} {:<70}", "Field", "Value");
    println!("{light}");
    for (label, value) in session.profile().summary_rows() {
        println!("{label:<30} {value:<70}");
    }

    if let Some(answers) = &session.profile().persona_answers {
        println!("\n{light}");
        println!(
            "{} PERSONA DETAILS:",
            answers.persona().to_string().to_uppercase()
        );
        println!("{light}");
        for (label, value) in answers.summary_rows() {
            println!("{label:<30} {value:<70}");
        }
    }

    if let Some(recommendations) = session.recommendation() {
        println!("\n{heavy}");
        println!("TABLE 2: BUSINESS ACTIVITY RECOMMENDATIONS");
        println!("{heavy}\n");
        println!("{recommendations}");
    }

    println!("\n{heavy}\n");
}

fn print_chat_help() {
    let light = "─".repeat(RULE_WIDTH);
    println!("{light}");
    println!("You can now:");
    println!("1. Ask questions about activities, services, pricing, or regulations");
    println!("2. Update any customer information (e.g., 'customer now wants 5 visas')");
    println!("3. Request alternative activities");
    println!("Type 'refresh' to regenerate recommendations with updated info");
    println!("Type 'done' to end conversation");
    println!("{light}");
}
