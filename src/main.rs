//! Resume matcher: resume and job description scoring tool

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use resume_matcher::cli::{self, Cli, Commands, ConfigAction};
use resume_matcher::config::Config;
use resume_matcher::input::InputManager;
use resume_matcher::output::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_matcher::processing::AnalysisEngine;
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display())),
        None => Config::load().context("Failed to load default configuration"),
    }
}

async fn run_command(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            job_text,
            format,
            detailed,
            save,
            ngrams,
            lexicon,
        } => {
            if let Some(format) = format {
                config.output.format = cli::parse_output_format(&format).map_err(anyhow::Error::msg)?;
            }
            if let Some(ngrams) = ngrams {
                config.scoring.max_ngram = ngrams;
            }
            if lexicon.is_some() {
                config.lexicon_path = lexicon;
            }
            config.output.detailed |= detailed;

            let engine = AnalysisEngine::new(&config).context("Failed to initialise analysis engine")?;
            let input_manager = InputManager::new(&config.extraction);

            let (job_text, job_source) = match (job, job_text) {
                (Some(path), _) => {
                    let extracted = input_manager
                        .load(&path)
                        .await
                        .with_context(|| format!("Failed to read job description {}", path.display()))?;
                    (extracted.text, Some(path.display().to_string()))
                }
                (None, Some(text)) => (text, None),
                (None, None) => anyhow::bail!("Either --job or --job-text is required"),
            };

            let document = input_manager
                .read_document(&resume)
                .await
                .with_context(|| format!("Failed to read resume {}", resume.display()))?;
            info!("Analyzing {} ({} bytes)", resume.display(), document.len());

            let mut result = engine
                .analyze_document(&document, &job_text)
                .with_context(|| format!("Failed to analyze resume {}", resume.display()))?;
            result.metadata.job_source = job_source;

            let generator = ReportGenerator::from_config(&config.output);
            let report = generator.generate_report(&result, config.output.format)?;
            println!("{}", report);

            if let Some(save) = save {
                let target = resolve_save_path(save, &config, &resume);
                // Files never get ANSI escapes
                let content = if config.output.color_output {
                    ReportGenerator::with_options(false, config.output.detailed, true, true)
                        .generate_report(&result, config.output.format)?
                } else {
                    report
                };
                save_report_to_file(&content, &target)
                    .with_context(|| format!("Failed to save report to {}", target.display()))?;
                println!("💾 Report saved to {}", target.display());
            }
        }

        Commands::Lexicon => {
            let engine = AnalysisEngine::new(&config).context("Failed to load lexicon")?;
            let lexicon = engine.lexicon();

            println!("📚 Lexicon\n");
            println!("Stopwords: {}", lexicon.stopwords.len());
            println!("Action verbs: {}", lexicon.action_verbs.len());
            println!("Industries: {}", lexicon.industries.len());
            for industry in &lexicon.industries {
                println!("  • {} ({} terms)", industry.name, industry.terms.len());
            }
            println!("\nSkill taxonomy: {} skills", lexicon.taxonomy.skill_count());
            for category in &lexicon.taxonomy.categories {
                let kind = if category.technical { "technical" } else { "general" };
                println!("  • {} [{}]: {} skills", category.name, kind, category.skills.len());
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
                println!("{}", rendered);
            }
            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save().context("Failed to write default configuration")?;
                println!("✅ Configuration reset successfully!");
            }
            Some(ConfigAction::Path) => {
                println!("{}", Config::config_path().display());
            }
        },
    }

    Ok(())
}

/// A directory target gets a generated, timestamped file name
fn resolve_save_path(save: PathBuf, config: &Config, resume: &Path) -> PathBuf {
    if save.is_dir() {
        let resume_name = resume.to_string_lossy();
        save.join(suggest_filename(config.output.format, &resume_name, true))
    } else {
        save
    }
}
