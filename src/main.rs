use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use reviewlens::aggregate::sentiment::SentimentOptions;
use reviewlens::config::{ClassifierBackend, Config, Segmenter};
use reviewlens::lexical::jieba::JiebaExtractor;
use reviewlens::lexical::layout::{OVERVIEW_MAX_WORDS, PER_MOVIE_MAX_WORDS};
use reviewlens::lexical::tfidf::SentenceTfIdfExtractor;
use reviewlens::lexical::{FrequencyEngine, FrequencyLayout, KeywordExtractor, StopWords};
use reviewlens::output::{export, terminal};
use reviewlens::pipeline::{run_overview, Analyzer, MovieCorpus, SentimentStage};
use reviewlens::records::dedup::merge_sources;
use reviewlens::relevance::{RelevanceClassifier, TopicLexicon};
use reviewlens::sentiment::SentimentClassifier;
use reviewlens::sources::files::default_output_dir;
use reviewlens::sources::{list_movies, load_movie, SourceSpec};

/// ReviewLens: which film reviews talk about mothers and daughters, and
/// what do they say?
///
/// Reads scraped review exports, keeps the ones about the mother–daughter
/// relationship, and summarizes their ratings, vocabulary and sentiment.
#[derive(Parser)]
#[command(name = "reviewlens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one movie directory under the data root
    Analyze {
        /// Movie directory name
        movie: String,

        /// Also score sentiment of relevant reviews
        #[arg(long)]
        sentiment: bool,

        /// Sentiment calls in flight at once (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Output directory (default: the movie's own directory)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Rows of the term table to print (default: 20)
        #[arg(long, default_value = "20")]
        top: usize,

        /// Log file (default: <out>/analysis_log.txt)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Pool every movie into one vocabulary and rank movies by sentiment
    Overview {
        /// Score sentiment per movie and print the spectrum
        #[arg(long)]
        sentiment: bool,

        /// Only pool reviews about the relationship
        #[arg(long)]
        relevant_only: bool,

        /// Sentiment calls in flight at once (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Output directory (default: the data root)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Rows of the term table to print (default: 50)
        #[arg(long, default_value = "50")]
        top: usize,
    },

    /// Show which relevance rule, if any, matches a text
    Explain {
        /// The text to classify
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze {
            movie,
            sentiment,
            concurrency,
            out,
            top,
            log_file,
        } => {
            // Check before the log file gets created inside it
            if !config.data_dir.join(&movie).is_dir() {
                anyhow::bail!(
                    "Movie directory not found: {}",
                    config.data_dir.join(&movie).display()
                );
            }
            let out_dir = out.unwrap_or_else(|| default_output_dir(&config.data_dir, &movie));
            let log_path = log_file.unwrap_or_else(|| out_dir.join("analysis_log.txt"));
            reviewlens::logging::init(Some(&log_path))?;

            config.validate()?;
            let classifier = if sentiment {
                config.require_classifier()?;
                Some(create_classifier(&config)?)
            } else {
                None
            };

            let analyzer = Analyzer::new(
                build_relevance(&config)?,
                build_engine(&config, PER_MOVIE_MAX_WORDS)?,
                reviewlens::lexical::frequency::DEFAULT_TALLY_SIZE,
            );

            let specs =
                SourceSpec::movie_defaults(&config.social_comment_column, &config.social_desc_column);
            let batches = load_movie(&config.data_dir, &movie, &specs)?;

            let stage = classifier.as_deref().map(|c| SentimentStage {
                classifier: c,
                options: sentiment_options(&config, concurrency),
            });
            let analysis = analyzer.run(&movie, batches, stage.as_ref()).await;

            terminal::display_analysis(&analysis, top);

            let written = export::export_analysis(&out_dir, &analysis)?;
            println!();
            for path in &written {
                println!("  {} {}", "wrote".dimmed(), path.display());
            }
            println!("  {} {}", "log".dimmed(), log_path.display());
        }

        Commands::Overview {
            sentiment,
            relevant_only,
            concurrency,
            out,
            top,
        } => {
            reviewlens::logging::init(None)?;
            config.validate()?;
            let classifier = if sentiment {
                config.require_classifier()?;
                Some(create_classifier(&config)?)
            } else {
                None
            };

            let relevance = build_relevance(&config)?;
            let engine = build_engine(&config, OVERVIEW_MAX_WORDS)?;
            let specs =
                SourceSpec::movie_defaults(&config.social_comment_column, &config.social_desc_column);

            let movies = list_movies(&config.data_dir)?;
            if movies.is_empty() {
                println!(
                    "No movie directories under {}. Nothing to summarize.",
                    config.data_dir.display()
                );
                return Ok(());
            }

            let mut corpora = Vec::new();
            for movie in movies {
                // One unreadable movie shouldn't sink the whole overview
                let batches = match load_movie(&config.data_dir, &movie, &specs) {
                    Ok(b) => b,
                    Err(e) => {
                        warn!(movie = %movie, error = %e, "Skipping movie");
                        continue;
                    }
                };
                let mut records = merge_sources(batches);
                if relevant_only {
                    records = relevance.classify_all(&records).records;
                }
                if records.is_empty() {
                    info!(movie = %movie, "No records, skipping");
                    continue;
                }
                corpora.push(MovieCorpus { movie, records });
            }

            let stage = classifier.as_deref().map(|c| SentimentStage {
                classifier: c,
                options: sentiment_options(&config, concurrency),
            });
            let overview = run_overview(&corpora, &engine, stage.as_ref()).await;

            terminal::display_overview(&overview, top);

            let out_dir = out.unwrap_or_else(|| config.data_dir.clone());
            let written = export::export_overview(&out_dir, &overview)?;
            println!();
            for path in &written {
                println!("  {} {}", "wrote".dimmed(), path.display());
            }
        }

        Commands::Explain { text } => {
            reviewlens::logging::init(None)?;
            config.validate()?;
            let relevance = build_relevance(&config)?;
            terminal::display_explain(&text, relevance.explain(&text));
        }
    }

    Ok(())
}

/// The relevance cascade, from the configured lexicon or the built-in one.
fn build_relevance(config: &Config) -> Result<RelevanceClassifier> {
    let lexicon = match &config.lexicon_path {
        Some(path) => {
            info!(path = %path.display(), "Using custom topic lexicon");
            TopicLexicon::from_file(path)?
        }
        None => TopicLexicon::mother_daughter(),
    };
    Ok(RelevanceClassifier::new(&lexicon))
}

/// The frequency engine with the configured extractor and stop words.
fn build_engine(config: &Config, max_words: usize) -> Result<FrequencyEngine> {
    let mut stop_words = StopWords::load(&config.stopwords_path)?;
    if config.builtin_stopwords {
        stop_words = stop_words.with_builtin_chinese();
    }

    let extractor: Box<dyn KeywordExtractor> = match config.segmenter {
        Segmenter::Jieba => {
            info!("Using jieba keyword extraction");
            Box::new(JiebaExtractor::new())
        }
        Segmenter::Whitespace => {
            info!("Using sentence-level TF-IDF keyword extraction");
            Box::new(SentenceTfIdfExtractor)
        }
    };

    Ok(FrequencyEngine::new(
        extractor,
        stop_words,
        FrequencyLayout::new(max_words).with_collocations(config.collocations),
    ))
}

fn create_classifier(config: &Config) -> Result<Box<dyn SentimentClassifier>> {
    match config.classifier_backend {
        ClassifierBackend::Onnx => {
            info!("Using local ONNX sentiment classifier");
            let classifier = reviewlens::sentiment::onnx::OnnxSentimentClassifier::load(
                &config.model_dir,
                config.model_token_type_ids,
            )?;
            Ok(Box::new(classifier))
        }
        ClassifierBackend::InferenceApi => {
            info!(model = %config.inference_model, "Using hosted inference sentiment classifier");
            let classifier = reviewlens::sentiment::inference_api::InferenceApiClassifier::new(
                &config.inference_url,
                &config.inference_model,
                config.hf_api_token.clone(),
                config.inference_rps,
            );
            Ok(Box::new(classifier))
        }
    }
}

fn sentiment_options(config: &Config, concurrency: usize) -> SentimentOptions {
    SentimentOptions {
        concurrency: concurrency.max(1),
        timeout: config.sentiment_timeout,
        show_progress: true,
    }
}
