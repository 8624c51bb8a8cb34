//! MentorQ CLI - Command-line interface for mentor queues

mod rpc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rpc::call_rpc;
use serde::Deserialize;
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";

#[derive(Parser)]
#[command(name = "mentorq")]
#[command(about = "MentorQ mentor queue CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "MENTORQ_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Acting user id
    #[arg(long, env = "MENTORQ_USER")]
    user: String,

    /// Acting user's role
    #[arg(long, env = "MENTORQ_ROLE", value_enum, default_value_t = RoleArg::Student)]
    role: RoleArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Student,
    Mentor,
    Admin,
}

impl RoleArg {
    fn as_str(self) -> &'static str {
        match self {
            RoleArg::Student => "student",
            RoleArg::Mentor => "mentor",
            RoleArg::Admin => "admin",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Register or update a team (admin)
    RegisterTeam {
        team_id: String,
        #[arg(long)]
        name: String,
        /// Mentor user id
        #[arg(long)]
        mentor: String,
        #[arg(long)]
        inactive: bool,
    },

    /// Open a queue for a team (team mentor or admin)
    Create {
        #[arg(long)]
        team: String,
        /// Session date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Estimated minutes per student
        #[arg(long)]
        minutes: Option<u32>,
    },

    /// Ask for a slot
    Join {
        queue_id: String,
        /// What you need help with
        #[arg(long)]
        note: Option<String>,
    },

    /// Accept a pending request
    Approve { queue_id: String, user_id: String },

    /// Decline a pending request
    Reject { queue_id: String, user_id: String },

    /// Leave the queue (yourself unless a user is given)
    Leave {
        queue_id: String,
        user_id: Option<String>,
    },

    /// Finish the current student and call the next one
    Next { queue_id: String },

    /// Set queue status
    Status {
        queue_id: String,
        /// ACTIVE, PAUSED or CLOSED
        status: String,
    },

    /// Set (or clear) the mentor note on a student's latest entry
    Note {
        queue_id: String,
        user_id: String,
        #[arg(long)]
        text: Option<String>,
    },

    /// Show a queue
    Show { queue_id: String },

    /// Show where a user stands (yourself unless a user is given)
    Position {
        queue_id: String,
        user_id: Option<String>,
    },

    /// Queue statistics
    Stats { queue_id: String },

    /// List active queues
    List,
}

#[derive(Deserialize)]
struct QueueView {
    id: String,
    team_id: String,
    session_date: String,
    status: String,
    estimated_minutes_per_member: u32,
    members: Vec<MemberView>,
}

#[derive(Deserialize)]
struct MemberView {
    user_id: String,
    ticket_number: u64,
    status: String,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    mentor_note: Option<String>,
}

#[derive(Tabled)]
struct MemberRow {
    ticket: u64,
    user: String,
    status: String,
    note: String,
    mentor_note: String,
}

#[derive(Deserialize, Tabled)]
struct SummaryRow {
    queue_id: String,
    team_id: String,
    session_date: String,
    status: String,
    waiting: usize,
    pending: usize,
}

fn print_queue(queue: &QueueView) {
    println!(
        "{} {}  {} {}  {} {}  {} {}",
        "Queue:".bold(),
        queue.id,
        "Team:".bold(),
        queue.team_id,
        "Date:".bold(),
        queue.session_date,
        "Status:".bold(),
        colored_status(&queue.status)
    );
    println!(
        "  {} {} min/student",
        "Estimate:".bold(),
        queue.estimated_minutes_per_member
    );
    println!();

    let rows: Vec<MemberRow> = queue
        .members
        .iter()
        .map(|m| MemberRow {
            ticket: m.ticket_number,
            user: m.user_id.clone(),
            status: m.status.clone(),
            note: m.note.clone().unwrap_or_default(),
            mentor_note: m.mentor_note.clone().unwrap_or_default(),
        })
        .collect();

    if rows.is_empty() {
        println!("{}", "No one has joined yet".yellow());
    } else {
        println!("{}", Table::new(rows));
    }
}

fn colored_status(status: &str) -> colored::ColoredString {
    match status {
        "ACTIVE" => status.green(),
        "PAUSED" => status.yellow(),
        _ => status.red(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let actor = json!({ "user_id": &cli.user, "role": cli.role.as_str() });
    let url = cli.rpc_url.as_str();

    match cli.command {
        Commands::RegisterTeam {
            team_id,
            name,
            mentor,
            inactive,
        } => {
            let params = json!({
                "actor": actor,
                "team_id": team_id,
                "name": name,
                "mentor_id": mentor,
                "is_active": !inactive,
            });
            call_rpc(url, "team.register.v1", params).await?;
            println!("{}", format!("✓ Team {} saved", team_id).green().bold());
        }

        Commands::Create {
            team,
            date,
            minutes,
        } => {
            let params = json!({
                "actor": actor,
                "team_id": team,
                "session_date": date,
                "estimated_minutes_per_member": minutes,
            });
            let result = call_rpc(url, "queue.create.v1", params).await?;
            let queue: QueueView = serde_json::from_value(result)?;
            println!("{}", "✓ Queue created".green().bold());
            println!();
            print_queue(&queue);
        }

        Commands::Join { queue_id, note } => {
            let params = json!({ "actor": actor, "queue_id": queue_id, "note": note });
            let result = call_rpc(url, "queue.join.v1", params).await?;
            let queue: QueueView = serde_json::from_value(result)?;

            let ticket = queue
                .members
                .iter()
                .filter(|m| m.user_id == cli.user)
                .map(|m| m.ticket_number)
                .max()
                .context("Joined entry missing from response")?;
            println!(
                "{}",
                format!("✓ Request sent. Your ticket is #{} (waiting for approval)", ticket)
                    .green()
                    .bold()
            );
        }

        Commands::Approve { queue_id, user_id } => {
            let params = json!({ "actor": actor, "queue_id": queue_id, "user_id": user_id });
            call_rpc(url, "queue.approve.v1", params).await?;
            println!("{}", format!("✓ {} approved", user_id).green().bold());
        }

        Commands::Reject { queue_id, user_id } => {
            let params = json!({ "actor": actor, "queue_id": queue_id, "user_id": user_id });
            call_rpc(url, "queue.reject.v1", params).await?;
            println!("{}", format!("✓ {} rejected", user_id).green().bold());
        }

        Commands::Leave { queue_id, user_id } => {
            let user_id = user_id.unwrap_or_else(|| cli.user.clone());
            let params = json!({ "actor": actor, "queue_id": queue_id, "user_id": user_id });
            call_rpc(url, "queue.leave.v1", params).await?;
            println!("{}", format!("✓ {} left the queue", user_id).green().bold());
        }

        Commands::Next { queue_id } => {
            let params = json!({ "actor": actor, "queue_id": queue_id });
            let result = call_rpc(url, "queue.advance.v1", params).await?;

            if let Some(done) = result["completed"].as_u64() {
                println!("  {} Ticket #{} completed", "✓".green(), done);
            }
            match result["served"].as_object() {
                Some(served) => println!(
                    "{}",
                    format!(
                        "▶ Now serving #{} ({})",
                        served["ticket_number"],
                        served["user_id"].as_str().unwrap_or("?")
                    )
                    .cyan()
                    .bold()
                ),
                None => println!("{}", "Nobody is waiting".yellow()),
            }
        }

        Commands::Status { queue_id, status } => {
            let params = json!({ "actor": actor, "queue_id": queue_id, "status": status });
            let result = call_rpc(url, "queue.status.v1", params).await?;
            let queue: QueueView = serde_json::from_value(result)?;
            println!(
                "{} {}",
                "✓ Queue is now".green().bold(),
                colored_status(&queue.status)
            );
        }

        Commands::Note {
            queue_id,
            user_id,
            text,
        } => {
            let params = json!({
                "actor": actor,
                "queue_id": queue_id,
                "user_id": user_id,
                "note": text,
            });
            call_rpc(url, "queue.mentor_note.v1", params).await?;
            println!("{}", format!("✓ Note saved for {}", user_id).green().bold());
        }

        Commands::Show { queue_id } => {
            let params = json!({ "actor": actor, "queue_id": queue_id });
            let result = call_rpc(url, "queue.get.v1", params).await?;
            let queue: QueueView = serde_json::from_value(result)?;
            print_queue(&queue);
        }

        Commands::Position { queue_id, user_id } => {
            let user_id = user_id.unwrap_or_else(|| cli.user.clone());
            let params = json!({ "queue_id": queue_id, "user_id": user_id });
            let result = call_rpc(url, "queue.position.v1", params).await?;

            match result["position"].as_object() {
                Some(pos) => {
                    println!("  {} #{}", "Ticket:".bold(), pos["ticket_number"]);
                    println!(
                        "  {} {} of {}",
                        "Position:".bold(),
                        pos["position"],
                        pos["waiting_count"]
                    );
                    println!(
                        "  {} ~{} min",
                        "Estimated wait:".bold(),
                        pos["estimated_wait_minutes"]
                    );
                }
                None => println!("{}", format!("{} is not waiting", user_id).yellow()),
            }
        }

        Commands::Stats { queue_id } => {
            let params = json!({ "queue_id": queue_id });
            let stats = call_rpc(url, "queue.stats.v1", params).await?;

            println!("{}", "Queue Statistics".cyan().bold());
            println!();
            println!("  {} {}", "Total:".bold(), stats["total"]);
            println!("  {} {}", "Pending:".bold(), stats["pending"]);
            println!("  {} {}", "Waiting:".bold(), stats["waiting"]);
            println!("  {} {}", "Current:".bold(), stats["current"]);
            println!("  {} {}", "Completed:".bold(), stats["completed"]);
            println!("  {} {}", "Cancelled:".bold(), stats["cancelled"]);
            println!("  {} {}", "Rejected:".bold(), stats["rejected"]);
            println!();
            println!(
                "  {} ~{} min",
                "Est. completion:".bold(),
                stats["estimated_completion_minutes"]
            );
            match stats["average_wait_minutes"].as_u64() {
                Some(avg) => println!("  {} {} min", "Average wait:".bold(), avg),
                None => println!("  {} n/a", "Average wait:".bold()),
            }
        }

        Commands::List => {
            let result = call_rpc(url, "queue.list_active.v1", json!({ "actor": actor })).await?;
            let rows: Vec<SummaryRow> = serde_json::from_value(result)?;
            if rows.is_empty() {
                println!("{}", "No active queues".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
        }
    }

    Ok(())
}
