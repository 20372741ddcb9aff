use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::pagination::Page;
use crate::public::{category_label, date_range, ContactForm, PublicAggregateView, Section, SectionStatus};
use crate::record::Record;

#[derive(Subcommand)]
pub enum PublicCommands {
    #[command(about = "Render the public portfolio page")]
    Show {
        #[arg(long, default_value_t = 1, help = "Skills page (1-based)")]
        skills_page: usize,
        #[arg(long, default_value_t = 1, help = "Projects page (1-based)")]
        projects_page: usize,
        #[arg(long, default_value_t = 1, help = "Certifications page (1-based)")]
        certifications_page: usize,
    },

    #[command(about = "Send a message through the public contact form")]
    SendMessage {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
}

pub async fn handle(cmd: PublicCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = load_console_state()?;
    let client = state.client(state.session())?;

    match cmd {
        PublicCommands::Show { skills_page, projects_page, certifications_page } => {
            let mut view = PublicAggregateView::load(&client, &config().display).await;
            view.skills_mut().jump(skills_page.saturating_sub(1));
            view.projects_mut().jump(projects_page.saturating_sub(1));
            view.certifications_mut().jump(certifications_page.saturating_sub(1));

            match output_format {
                OutputFormat::Json => print_json(&view),
                OutputFormat::Text => {
                    print_text(&view);
                    Ok(())
                }
            }
        }
        PublicCommands::SendMessage { name, email, message } => {
            let mut form = ContactForm::new(name, email, message);
            match form.send_message(&client).await {
                Some(status) if status.is_success() => output_success(&output_format, status.message(), None),
                Some(status) => {
                    output_error(&output_format, status.message(), Some("SEND_FAILED"))?;
                    Err(anyhow::anyhow!("Contact message was not sent"))
                }
                None => Ok(()),
            }
        }
    }
}

fn page_json(page: &Page<'_, Record>) -> Value {
    json!({
        "page": page.index,
        "total_pages": page.total_pages,
        "items": page.items.iter().map(Record::to_value).collect::<Vec<_>>(),
    })
}

fn print_json(view: &PublicAggregateView) -> anyhow::Result<()> {
    let skills = view.skills().current_page();
    let cards: Vec<Value> = skills
        .items
        .iter()
        .map(|card| {
            json!({
                "category": card.category,
                "label": category_label(&card.category),
                "card_index": card.card_index,
                "total_cards": card.total_cards,
                "skills": card.items.iter().map(Record::to_value).collect::<Vec<_>>(),
            })
        })
        .collect();

    let body = json!({
        "profile": view.profile().map(Record::to_value),
        "contact": view.contact().map(Record::to_value),
        "skills": { "page": skills.index, "total_pages": skills.total_pages, "cards": cards },
        "projects": page_json(&view.projects().current_page()),
        "certifications": page_json(&view.certifications().current_page()),
        "experience": view.experience().iter().map(Record::to_value).collect::<Vec<_>>(),
        "education": view.education().iter().map(Record::to_value).collect::<Vec<_>>(),
        "sections": view.statuses(),
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn heading(view: &PublicAggregateView, section: Section, title: &str) {
    println!();
    match view.section_status(section) {
        Some(SectionStatus::Failed { message }) => println!("== {} == (unavailable: {})", title, message),
        _ => println!("== {} ==", title),
    }
}

fn print_text(view: &PublicAggregateView) {
    match view.profile() {
        Some(p) => {
            println!("{}", p.get_str("name").unwrap_or_default());
            println!("{}", p.get_str("title").unwrap_or_default());
            if let Some(bio) = p.get_str("bio") {
                println!("{}", bio);
            }
        }
        None => println!("(no profile)"),
    }

    heading(view, Section::Skills, "Skills");
    let skills = view.skills().current_page();
    for card in skills.items {
        let suffix = if card.is_continued() {
            format!(" ({}/{})", card.card_index + 1, card.total_cards)
        } else {
            String::new()
        };
        println!("{}{}", category_label(&card.category), suffix);
        for skill in &card.items {
            let pct = skill.get("percentage").map(display_value).unwrap_or_default();
            println!("  {:<24} {}%", skill.get_str("name").unwrap_or_default(), pct);
        }
    }
    println!("Page {}", skills.label());

    heading(view, Section::Experience, "Experience");
    for exp in view.experience() {
        println!(
            "{} at {} ({})",
            exp.get_str("role").unwrap_or_default(),
            exp.get_str("company_name").unwrap_or_default(),
            date_range(exp.get_str("start_date"), exp.get_str("end_date"))
        );
    }

    heading(view, Section::Projects, "Projects");
    let projects = view.projects().current_page();
    for project in projects.items {
        println!("{}  [{}]", project.get_str("title").unwrap_or_default(), project.get_str("tech_stack").unwrap_or_default());
    }
    println!("Page {}", projects.label());

    heading(view, Section::Certifications, "Certifications");
    let certs = view.certifications().current_page();
    for cert in certs.items {
        println!("{}", cert.get_str("title").unwrap_or_default());
    }
    println!("Page {}", certs.label());

    heading(view, Section::Education, "Education");
    for edu in view.education() {
        println!(
            "{}, {} ({})",
            edu.get_str("degree").unwrap_or_default(),
            edu.get_str("institution").unwrap_or_default(),
            date_range(edu.get_str("start_date"), edu.get_str("end_date"))
        );
    }

    heading(view, Section::Contact, "Contact");
    if let Some(contact) = view.contact() {
        for field in ["email", "phone", "address", "github_link", "linkedin_link"] {
            if let Some(v) = contact.get_str(field).filter(|v| !v.is_empty()) {
                println!("{:<14} {}", field, v);
            }
        }
    }
}
