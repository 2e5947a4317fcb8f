use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use uuid::Uuid;

use careguide_lib::config;
use careguide_lib::db;
use careguide_lib::feedback::FeedbackLedger;
use careguide_lib::models::enums::AppointmentStatus;
use careguide_lib::questionnaire::{
    question, questions, AnswerSet, QuestionId, QuestionKind, QuestionnaireSession, StepOutcome,
};
use careguide_lib::records::{self, AppointmentForm, MedicalRecordForm, PatientForm};
use careguide_lib::suggestions::{generate_suggestions, Condition, Suggestion};
use careguide_lib::treatment::{self, TreatmentPlan};

#[derive(Parser)]
#[command(name = "careguide")]
#[command(version, about = "Symptom questionnaire, condition suggestions and patient records")]
struct Cli {
    /// Record store location (defaults to the application data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest likely conditions from questionnaire answers
    Assess(AssessArgs),
    /// Show the treatment plan for one condition
    Treatment {
        /// Condition key (e.g. cold_flu) or display name
        condition: String,
    },
    /// List the questionnaire
    Questions,
    /// Manage patients
    #[command(subcommand)]
    Patients(PatientCommand),
    /// Manage appointments
    #[command(subcommand)]
    Appointments(AppointmentCommand),
    /// Manage medical records
    #[command(subcommand)]
    Records(RecordCommand),
    /// Dashboard totals and upcoming appointments
    Overview,
}

#[derive(Args)]
struct AssessArgs {
    /// Fever answer (single choice)
    #[arg(long)]
    fever: Option<String>,
    /// Pain types (comma-separated)
    #[arg(long)]
    pain: Option<String>,
    /// Respiratory symptoms (comma-separated)
    #[arg(long)]
    respiratory: Option<String>,
    /// Overall severity, 1-10
    #[arg(long)]
    severity: Option<String>,
    /// Symptom duration (single choice)
    #[arg(long)]
    duration: Option<String>,
    /// Digestive symptoms (comma-separated)
    #[arg(long)]
    digestive: Option<String>,
    /// Walk through the questionnaire one step at a time
    #[arg(long, short, conflicts_with_all = ["fever", "pain", "respiratory", "severity", "duration", "digestive"])]
    interactive: bool,
    /// Rate the top suggestion, 1-5 stars
    #[arg(long)]
    rate: Option<u8>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum PatientCommand {
    /// Register a patient
    Add {
        first_name: String,
        last_name: String,
        /// Date of birth (YYYY-MM-DD)
        date_of_birth: String,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        blood_type: Option<String>,
        /// Comma-separated
        #[arg(long, default_value = "")]
        allergies: String,
        /// Comma-separated
        #[arg(long, default_value = "")]
        chronic_conditions: String,
        #[arg(long)]
        emergency_contact_name: Option<String>,
        #[arg(long)]
        emergency_contact_phone: Option<String>,
    },
    /// List patients, newest first
    List,
    /// Search by name or email
    Search { term: String },
    /// Delete a patient and their medical records
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum AppointmentCommand {
    /// Schedule an appointment
    Add {
        patient_id: String,
        /// Date (YYYY-MM-DD)
        date: String,
        /// Time (HH:MM)
        #[arg(long)]
        time: Option<String>,
        /// Minutes
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long, default_value = "")]
        purpose: String,
        #[arg(long)]
        doctor: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List appointments by date
    List,
    /// Change an appointment's status
    Status {
        id: Uuid,
        /// scheduled, confirmed, completed, cancelled or no_show
        status: String,
    },
}

#[derive(Subcommand)]
enum RecordCommand {
    /// Add a medical record
    Add {
        patient_id: String,
        /// Visit date (YYYY-MM-DD)
        visit_date: String,
        condition_name: String,
        #[arg(long)]
        diagnosis: Option<String>,
        /// Comma-separated
        #[arg(long, default_value = "")]
        symptoms: String,
        #[arg(long)]
        treatment: Option<String>,
        /// Comma-separated
        #[arg(long, default_value = "")]
        medications: String,
        #[arg(long)]
        notes: Option<String>,
        /// active, resolved or chronic
        #[arg(long)]
        status: Option<String>,
        /// low, medium or high
        #[arg(long)]
        severity: Option<String>,
    },
    /// List medical records, most recent visit first
    List {
        /// Only this patient's records
        #[arg(long)]
        patient: Option<Uuid>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    careguide_lib::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Assess(args) => assess(args)?,
        Commands::Treatment { condition } => {
            let condition = Condition::from_str(&condition)?;
            print_plan(&treatment::plan_for(condition));
        }
        Commands::Questions => {
            for (step, q) in questions().iter().enumerate() {
                println!("{}. [{}] {} ({})", step + 1, q.id, q.prompt, q.kind);
                if !q.options.is_empty() {
                    println!("   {}", q.options.join(" | "));
                }
            }
        }
        Commands::Patients(cmd) => patients(&open_store(cli.db)?, cmd)?,
        Commands::Appointments(cmd) => appointments(&open_store(cli.db)?, cmd)?,
        Commands::Records(cmd) => medical_records(&open_store(cli.db)?, cmd)?,
        Commands::Overview => {
            let view = records::overview(&open_store(cli.db)?)?;
            println!(
                "Patients: {}  Appointments: {} ({} scheduled)  Records: {}",
                view.total_patients,
                view.total_appointments,
                view.scheduled_appointments,
                view.total_records
            );
            println!("Recent patients:");
            if view.recent_patients.is_empty() {
                println!("  No patients yet.");
            }
            for p in &view.recent_patients {
                println!("  {}  {}  born {}", p.id, p.display_name(), p.date_of_birth);
            }
            println!("Upcoming appointments:");
            if view.upcoming.is_empty() {
                println!("  No upcoming appointments.");
            }
            for entry in view.upcoming {
                let a = &entry.appointment;
                println!(
                    "  {} {} {} [{}] {}",
                    a.appointment_date,
                    a.appointment_time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
                    entry.patient_name,
                    a.status.as_str(),
                    a.purpose
                );
            }
        }
    }

    Ok(())
}

fn open_store(path: Option<PathBuf>) -> Result<Connection, db::DatabaseError> {
    let path = path.unwrap_or_else(config::database_path);
    db::open_database(&path)
}

fn assess(args: AssessArgs) -> Result<(), Box<dyn std::error::Error>> {
    let answers = if args.interactive {
        run_questionnaire()?
    } else {
        let mut answers = AnswerSet::new();
        for (id, raw) in [
            (QuestionId::Fever, &args.fever),
            (QuestionId::Pain, &args.pain),
            (QuestionId::Respiratory, &args.respiratory),
            (QuestionId::Severity, &args.severity),
            (QuestionId::Duration, &args.duration),
            (QuestionId::Digestive, &args.digestive),
        ] {
            if let Some(raw) = raw {
                answers.set(id, question(id).parse_input(raw)?);
            }
        }
        answers
    };

    let suggestions = generate_suggestions(&answers);
    let plan = treatment::treatment_plan(&suggestions);

    if let Some(stars) = args.rate {
        let mut ledger = FeedbackLedger::new();
        if let Some(primary) = suggestions.first() {
            ledger.rate(primary.condition, stars)?;
            eprintln!("{}", feedback_confirmation(primary.condition, stars));
        }
    }

    if args.json {
        let out = serde_json::json!({
            "answers": answers,
            "suggestions": suggestions,
            "treatment": plan,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (rank, s) in suggestions.iter().enumerate() {
        print_suggestion(rank + 1, s);
    }
    if let Some(plan) = plan {
        println!();
        print_plan(&plan);
    }
    println!();
    println!("This is not a diagnosis. Consult a healthcare professional.");
    Ok(())
}

fn feedback_confirmation(condition: Condition, stars: u8) -> String {
    format!(
        "Thank you for your feedback! Rated {condition} {stars}/{} stars.",
        careguide_lib::feedback::MAX_STARS
    )
}

/// Prompt for each step on stdin. "back" returns to the previous step,
/// a blank line on a multiple-choice step records "nothing selected".
fn run_questionnaire() -> Result<AnswerSet, Box<dyn std::error::Error>> {
    let mut session = QuestionnaireSession::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let q = session.current_question();
        println!(
            "\n[{}/{} · {}%] {}",
            session.current_step() + 1,
            session.total_steps(),
            session.progress_percent(),
            q.prompt
        );
        for (i, option) in q.options.iter().enumerate() {
            println!("  {}) {option}", i + 1);
        }
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Err("questionnaire aborted before completion".into());
        };
        let line = line?;
        if line.trim().eq_ignore_ascii_case("back") {
            session.previous();
            continue;
        }

        match q.parse_input(&expand_option_numbers(&line, q.kind, q.options)) {
            Ok(value) => session.answer(value)?,
            Err(e) => {
                println!("  {e}");
                continue;
            }
        }
        match session.next()? {
            StepOutcome::Advanced(_) => {}
            StepOutcome::Complete(answers) => return Ok(answers),
        }
    }
}

/// Lets the user type "2" or "1,3" instead of the option labels. Only
/// multiple-choice input is split on commas; single-choice labels may
/// contain one ("Yes, high fever ...").
fn expand_option_numbers(line: &str, kind: QuestionKind, options: &[&str]) -> String {
    let pick = |part: &str| -> String {
        part.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i))
            .map(|o| o.to_string())
            .unwrap_or_else(|| part.to_string())
    };
    match kind {
        QuestionKind::Scale => line.to_string(),
        QuestionKind::Single => pick(line.trim()),
        QuestionKind::Multiple => line
            .split(',')
            .map(str::trim)
            .map(pick)
            .collect::<Vec<_>>()
            .join(","),
    }
}

fn print_suggestion(rank: usize, s: &Suggestion) {
    println!(
        "{rank}. {} ({}%, {} severity, {})",
        s.condition,
        s.probability,
        s.severity.as_str(),
        s.category
    );
    println!("   {}", s.description);
    println!("   Typical symptoms: {}", s.symptoms.join(", "));
    for r in &s.recommendations {
        println!("   - {r}");
    }
}

fn print_plan(plan: &TreatmentPlan) {
    println!("Treatment for {}", plan.condition);
    if plan.medicines.is_empty() {
        println!("  No over-the-counter medicines; see a healthcare provider.");
    }
    for m in &plan.medicines {
        println!("  {} ({}): {}, {}, {}", m.name, m.category, m.dosage, m.frequency, m.duration);
        for w in &m.warnings {
            println!("    ! {w}");
        }
    }
    println!("  Home care:");
    for r in &plan.home_remedies {
        println!("  - {r}");
    }
}

fn patients(conn: &Connection, cmd: PatientCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        PatientCommand::Add {
            first_name,
            last_name,
            date_of_birth,
            gender,
            phone,
            email,
            address,
            blood_type,
            allergies,
            chronic_conditions,
            emergency_contact_name,
            emergency_contact_phone,
        } => {
            let form = PatientForm {
                first_name,
                last_name,
                date_of_birth,
                gender,
                phone,
                email,
                address,
                blood_type,
                allergies,
                chronic_conditions,
                emergency_contact_name,
                emergency_contact_phone,
            };
            let patient = records::create_patient(conn, &form)?;
            println!("Created patient {} ({})", patient.display_name(), patient.id);
        }
        PatientCommand::List => print_patients(&records::list_patients(conn)?),
        PatientCommand::Search { term } => print_patients(&records::search_patients(conn, &term)?),
        PatientCommand::Delete { id } => {
            records::delete_patient(conn, &id)?;
            println!("Deleted patient {id}");
        }
    }
    Ok(())
}

fn print_patients(patients: &[careguide_lib::models::Patient]) {
    if patients.is_empty() {
        println!("No patients found.");
        return;
    }
    for p in patients {
        println!(
            "{}  {}  born {}  {}",
            p.id,
            p.display_name(),
            p.date_of_birth,
            p.email.as_deref().unwrap_or("-")
        );
    }
}

fn appointments(
    conn: &Connection,
    cmd: AppointmentCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AppointmentCommand::Add {
            patient_id,
            date,
            time,
            duration,
            purpose,
            doctor,
            department,
            notes,
        } => {
            let form = AppointmentForm {
                patient_id,
                appointment_date: date,
                appointment_time: time,
                duration_minutes: duration,
                purpose,
                doctor_name: doctor,
                department,
                notes,
            };
            let appt = records::create_appointment(conn, &form)?;
            println!("Scheduled appointment {} on {}", appt.id, appt.appointment_date);
        }
        AppointmentCommand::List => {
            let list = records::list_appointments(conn)?;
            if list.is_empty() {
                println!("No appointments found.");
            }
            for a in list {
                println!(
                    "{}  {} {}  {} min  [{}]  {}",
                    a.id,
                    a.appointment_date,
                    a.appointment_time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
                    a.duration_minutes,
                    a.status.as_str(),
                    a.purpose
                );
            }
        }
        AppointmentCommand::Status { id, status } => {
            let status = AppointmentStatus::from_str(&status)?;
            let appt = records::set_appointment_status(conn, &id, status)?;
            println!("Appointment {} is now {}", appt.id, appt.status.as_str());
        }
    }
    Ok(())
}

fn medical_records(conn: &Connection, cmd: RecordCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        RecordCommand::Add {
            patient_id,
            visit_date,
            condition_name,
            diagnosis,
            symptoms,
            treatment,
            medications,
            notes,
            status,
            severity,
        } => {
            let form = MedicalRecordForm {
                patient_id,
                visit_date,
                condition_name,
                diagnosis,
                symptoms,
                treatment,
                medications,
                notes,
                status,
                severity,
            };
            let record = records::create_medical_record(conn, &form)?;
            println!("Added record {} for {}", record.id, record.condition_name);
        }
        RecordCommand::List { patient } => {
            let list = match patient {
                Some(id) => records::list_records_for_patient(conn, &id)?,
                None => records::list_medical_records(conn)?,
            };
            if list.is_empty() {
                println!("No medical records found.");
            }
            for r in list {
                println!(
                    "{}  {}  {}  [{} / {}]  {}",
                    r.visit_date,
                    r.patient_id,
                    r.condition_name,
                    r.status.as_str(),
                    r.severity.as_str(),
                    r.symptoms.join(", ")
                );
            }
        }
    }
    Ok(())
}
