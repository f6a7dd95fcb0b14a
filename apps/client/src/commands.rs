use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::backend::HealthStatus;
use crate::cli::{Commands, ProfileCommands};
use crate::errors::ClientError;
use crate::models::analysis::{AnalysisForm, AnalysisResult, ResumeFile};
use crate::models::job::JobRecord;
use crate::models::profile::Profile;
use crate::models::search::{Location, SearchQuery, DEFAULT_KEYWORD, POPULAR_SEARCHES};
use crate::orchestrator::analysis::AnalysisState;
use crate::orchestrator::search::SearchState;
use crate::profile::editor::{NewExperience, NewProject, ProfileEditor};
use crate::state::AppState;

const DESCRIPTION_PREVIEW_CHARS: usize = 150;

pub async fn run(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Profile { action } => profile(state, action),
        Commands::Search { keyword, location } => search(state, keyword, location).await,
        Commands::Suggestions => {
            suggestions();
            Ok(())
        }
        Commands::Analyze {
            file,
            skills,
            education,
            location,
            domain,
        } => {
            let form = analysis_form(
                state.store.load_saved().as_ref(),
                skills,
                education,
                location,
                domain,
            );
            analyze(state, &file, form).await
        }
        Commands::Health => {
            let timeout = state.config.request_timeout_secs;
            let search = state.search_service.health().await;
            println!("{}", health_line("search", &state.config.search_api_url, timeout, &search));
            let analysis = state.analysis_service.health().await;
            println!(
                "{}",
                health_line("analysis", &state.config.analysis_api_url, timeout, &analysis)
            );
            Ok(())
        }
    }
}

/// Prints a line to stderr each time the watched state enters a step worth announcing.
fn report_progress<S, F>(mut rx: watch::Receiver<S>, describe: F) -> JoinHandle<()>
where
    S: Send + Sync + 'static,
    F: Fn(&S) -> Option<&'static str> + Send + 'static,
{
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let line = describe(&rx.borrow_and_update());
            if let Some(line) = line {
                eprintln!("{line}");
            }
        }
    })
}

/// Surfaces the user-facing message; technical detail has already been logged.
fn fail(e: ClientError) -> anyhow::Error {
    anyhow!(e.user_message())
}

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

fn profile(state: &AppState, action: ProfileCommands) -> Result<()> {
    let mut editor = ProfileEditor::open(&state.store);
    editor.begin_edit();

    match action {
        ProfileCommands::Show => {
            editor.cancel();
            match state.store.load_saved() {
                Some(profile) => print_profile(&profile),
                None => println!("No profile saved yet."),
            }
            return Ok(());
        }
        ProfileCommands::Clear => {
            state.store.clear().map_err(fail)?;
            println!("Profile cleared ({}).", state.store.path().display());
            return Ok(());
        }
        ProfileCommands::Set { field, value } => {
            editor.set_field(field, value).map_err(fail)?;
        }
        ProfileCommands::AddSkill { skill } => {
            if !editor.add_skill(&skill).map_err(fail)? {
                println!("'{}' is already listed or blank; nothing to add.", skill.trim());
                return Ok(());
            }
        }
        ProfileCommands::RemoveSkill { skill } => {
            if !editor.remove_skill(&skill).map_err(fail)? {
                bail!("No skill named '{}'", skill.trim());
            }
        }
        ProfileCommands::AddProject {
            title,
            description,
            tech,
        } => {
            let id = editor
                .add_project(NewProject {
                    title,
                    description,
                    tech,
                })
                .map_err(fail)?;
            println!("Added project {id}");
        }
        ProfileCommands::RemoveProject { id } => {
            if !editor.remove_project(id).map_err(fail)? {
                bail!("No project with id {id}");
            }
        }
        ProfileCommands::AddExperience {
            title,
            company,
            duration,
            description,
        } => {
            let id = editor
                .add_experience(NewExperience {
                    title,
                    company,
                    duration,
                    description,
                })
                .map_err(fail)?;
            println!("Added experience {id}");
        }
        ProfileCommands::RemoveExperience { id } => {
            if !editor.remove_experience(id).map_err(fail)? {
                bail!("No experience entry with id {id}");
            }
        }
        ProfileCommands::Photo { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Could not read '{}'", file.display()))?;
            editor
                .set_photo(image_content_type(&file), &bytes)
                .map_err(fail)?;
        }
    }

    let saved = editor.save(&state.store).map_err(fail)?;
    if !saved.is_complete() {
        println!("Saved. Add a name and email to complete your profile.");
    } else {
        println!("Profile saved.");
    }
    Ok(())
}

fn print_profile(profile: &Profile) {
    println!("{}", or_dash(&profile.name));
    println!("  email:     {}", or_dash(&profile.email));
    println!("  phone:     {}", or_dash(&profile.phone));
    println!("  location:  {}", or_dash(&profile.location));
    println!("  education: {}", or_dash(&profile.education));
    if !profile.bio.is_empty() {
        println!("  bio:       {}", profile.bio);
    }
    if !profile.skills.is_empty() {
        println!("  skills:    {}", profile.skills.join(", "));
    }
    for p in &profile.projects {
        println!("  project [{}] {}: {}", p.id, p.title, p.description);
    }
    for e in &profile.experience {
        println!("  experience [{}] {} at {} {}", e.id, e.title, e.company, e.duration);
    }
    if !profile.profile_photo.is_empty() {
        println!("  photo:     set");
    }
    if let Some(updated) = profile.updated_at {
        println!("  updated:   {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn image_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Search
// ────────────────────────────────────────────────────────────────────────────

/// Fills in the default keyword, and the profile's city when it is a recognized one.
fn search_query(keyword: Option<String>, location: Option<Location>, profile: &Profile) -> SearchQuery {
    let keyword = keyword
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_KEYWORD.to_string());
    let location = location.unwrap_or_else(|| Location::from_free_text(&profile.location));
    SearchQuery::new(keyword, location)
}

async fn search(state: &AppState, keyword: Option<String>, location: Option<Location>) -> Result<()> {
    let query = search_query(keyword, location, &state.store.load());
    let progress = report_progress(state.search.subscribe(), |s: &SearchState| {
        s.is_pending().then_some("Searching for internships...")
    });
    let completion = state.search.search(query).await;
    progress.abort();
    let completion = completion.map_err(fail)?;

    match completion.into_current() {
        Some(SearchState::Success { query, jobs }) => {
            print_results(&query, &jobs);
            Ok(())
        }
        Some(SearchState::SuccessWithFallback {
            query,
            jobs,
            advisory,
        }) => {
            eprintln!("{advisory}");
            print_results(&query, &jobs);
            Ok(())
        }
        Some(SearchState::Failed { message, .. }) => bail!(message),
        other => {
            debug!("Search finished without a result: {other:?}");
            Ok(())
        }
    }
}

fn print_results(query: &SearchQuery, jobs: &[JobRecord]) {
    if jobs.is_empty() {
        println!(
            "No internships found for '{}' in {}. Try a broader keyword.",
            query.keyword, query.location
        );
        return;
    }
    println!(
        "{} internships for '{}' in {}",
        jobs.len(),
        query.keyword,
        query.location
    );
    for job in jobs {
        print_job(job);
    }
}

fn print_job(job: &JobRecord) {
    println!();
    println!("{}  [{} match, {}]", job.title, job.match_percent, job.tier().label());
    println!("  {} · {}", job.company, job.location);
    println!("  {}", preview(&job.description, DESCRIPTION_PREVIEW_CHARS));
    println!("  {}", job.apply_link);
}

/// First `max` characters, with an ellipsis when anything was cut.
fn preview(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

fn suggestions() {
    println!("Popular searches:");
    for (keyword, location) in POPULAR_SEARCHES {
        println!("  client search --keyword \"{keyword}\" --location {location}");
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis
// ────────────────────────────────────────────────────────────────────────────

/// Starts from the saved profile and lets explicit flags win.
fn analysis_form(
    saved: Option<&Profile>,
    skills: Option<String>,
    education: Option<String>,
    location: Option<String>,
    domain: Option<String>,
) -> AnalysisForm {
    let mut form = saved.map(AnalysisForm::from_profile).unwrap_or_default();
    if let Some(skills) = skills {
        form.skills = skills;
    }
    if let Some(education) = education {
        form.education = education;
    }
    if let Some(location) = location.filter(|l| !l.trim().is_empty()) {
        form.location = location;
    }
    if let Some(domain) = domain {
        form.domain = domain;
    }
    form
}

async fn analyze(state: &AppState, file: &Path, form: AnalysisForm) -> Result<()> {
    let resume = ResumeFile::from_path(file).map_err(fail)?;
    let progress = report_progress(state.analysis.subscribe(), |s: &AnalysisState| match s {
        AnalysisState::Validating => Some("Checking resume..."),
        AnalysisState::Submitting => Some("Analyzing your resume..."),
        _ => None,
    });
    let completion = state.analysis.submit(Some(resume), form).await;
    progress.abort();
    let completion = completion.map_err(fail)?;

    match completion.into_current() {
        Some(AnalysisState::Success { result }) => {
            print_analysis(&result);
            Ok(())
        }
        Some(AnalysisState::Failed { message }) => bail!(message),
        other => {
            debug!("Analysis finished without a result: {other:?}");
            Ok(())
        }
    }
}

fn print_analysis(result: &AnalysisResult) {
    println!(
        "ATS score: {:.0}/100 ({}, {})",
        result.ats_score,
        result.tier().label(),
        result.status
    );
    if result.needs_improvement() && !result.missing_keywords.is_empty() {
        println!(
            "Your resume is missing keywords recruiters look for: {}",
            result.missing_keywords.join(", ")
        );
    }
    if result.recommendations.is_empty() {
        println!("No recommendations for '{}'.", result.effective_search_keyword);
        return;
    }
    println!();
    println!("Recommended for '{}':", result.effective_search_keyword);
    for job in &result.recommendations {
        print_job(job);
    }
}

fn health_line(
    name: &str,
    url: &str,
    timeout_secs: u64,
    outcome: &Result<HealthStatus, ClientError>,
) -> String {
    match outcome {
        Ok(status) => format!(
            "{name} ({url}): {} {}",
            status.status,
            status.message.as_deref().unwrap_or_default()
        )
        .trim_end()
        .to_string(),
        Err(e) => format!(
            "{name} ({url}): {} (timeout {timeout_secs}s)",
            e.user_message()
        ),
    }
}
