use console::style;

use crate::ai::{AnalysisMetrics, TokenCostEstimate};
use crate::types::{SentimentAnalysisResult, SentimentError, ThemeSentiment, ValidationError};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Human-readable rendering of a validated analysis
    pub fn analysis(&self, business: &str, result: &SentimentAnalysisResult) {
        let summary = &result.sentiment_summary;
        let breakdown = &summary.breakdown;

        self.header(&format!("Sentiment analysis: {}", business));
        println!(
            "{} {} (score {}/100)",
            style("Overall:").bold(),
            summary.overall_label,
            summary.sentiment_score
        );
        println!("{}", summary.short_summary);
        println!(
            "  positive {:>3} ({:.1}%)   mixed {:>3} ({:.1}%)   negative {:>3} ({:.1}%)   of {}",
            breakdown.positive.count,
            breakdown.positive.percentage,
            breakdown.mixed.count,
            breakdown.mixed.percentage,
            breakdown.negative.count,
            breakdown.negative.percentage,
            breakdown.total_count()
        );

        if !result.themes.is_empty() {
            self.section("Themes");
            for theme in &result.themes {
                let marker = match theme.sentiment {
                    ThemeSentiment::Strength => style("+").green(),
                    ThemeSentiment::Improvement => style("-").yellow(),
                };
                println!(
                    "{} {} ({} mentions)",
                    marker,
                    style(&theme.name).bold(),
                    theme.mention_count
                );
                for quote in &theme.supporting_quotes {
                    println!(
                        "    \"{}\" {}",
                        quote.excerpt,
                        style(format!("[{}]", quote.review_id)).dim()
                    );
                }
            }
        }

        if !result.improvement_ideas.is_empty() {
            self.section("Improvement ideas");
            for (idx, idea) in result.improvement_ideas.iter().enumerate() {
                println!("{}. {}", idx + 1, style(&idea.title).bold());
                println!("   {}", idea.description);
                println!(
                    "   {}",
                    style(format!("from: {}", idea.source_themes.join(", "))).dim()
                );
            }
        }

        if let Some(limitations) = &result.limitations {
            self.section("Limitations");
            println!("{}", limitations);
        }
    }

    pub fn metrics(&self, metrics: &AnalysisMetrics) {
        self.section("Metrics");
        println!("{}", metrics.display());
    }

    pub fn estimate(&self, review_count: usize, estimate: &TokenCostEstimate) {
        self.header(&format!("Cost estimate for {} reviews", review_count));
        println!("{}", estimate.display());
    }

    pub fn validation_errors(&self, errors: &[ValidationError]) {
        self.section(&format!("{} validation error(s)", errors.len()));
        for err in errors {
            println!("  {} {}", style("✗").red(), err);
        }
    }

    /// User-facing message first, technical detail second
    pub fn failure(&self, err: &SentimentError) {
        self.error(err.user_message());
        eprintln!(
            "  {} {}",
            style(format!("[{}]", err.kind())).dim(),
            style(err.to_string()).dim()
        );
        let errors = err.validation_errors();
        if !errors.is_empty() {
            for validation in errors {
                eprintln!("    - {}", validation);
            }
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
