use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::profile::ProfileField;
use crate::models::search::Location;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Internship search and resume analysis client")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Profile operations
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },

    /// Search for internships
    Search {
        /// Keyword (defaults to "product management intern")
        #[arg(long)]
        keyword: Option<String>,
        /// City (defaults to the profile's location, else india)
        #[arg(long, value_enum)]
        location: Option<Location>,
    },

    /// List popular searches
    Suggestions,

    /// Submit a resume (PDF or DOCX) for ATS scoring and recommendations
    Analyze {
        /// Path to the resume
        file: PathBuf,
        /// Comma-separated skills (defaults to the profile's skills)
        #[arg(long)]
        skills: Option<String>,
        #[arg(long)]
        education: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Preferred domain, e.g. "product management"
        #[arg(long)]
        domain: Option<String>,
    },

    /// Check both services
    Health,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Print the saved profile
    Show,
    /// Set a single field
    Set {
        #[arg(value_enum)]
        field: ProfileField,
        value: String,
    },
    AddSkill {
        skill: String,
    },
    RemoveSkill {
        skill: String,
    },
    AddProject {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Technologies used
        #[arg(long, default_value = "")]
        tech: String,
    },
    RemoveProject {
        id: u64,
    },
    AddExperience {
        #[arg(long)]
        title: String,
        #[arg(long)]
        company: String,
        /// e.g. "Jun 2024 - Aug 2024"
        #[arg(long, default_value = "")]
        duration: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    RemoveExperience {
        id: u64,
    },
    /// Set the profile photo from an image file
    Photo {
        file: PathBuf,
    },
    /// Delete the saved profile
    Clear,
}
