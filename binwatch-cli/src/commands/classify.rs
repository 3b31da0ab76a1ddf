//! Classify command - send one image to the classifier.

use std::path::Path;

use binwatch::classify::{Classifier, OpenAiClassifier};
use binwatch::http::ReqwestClient;
use binwatch::verdict::{ExpectedItems, IgnoreList};

use super::common::{load_config, load_frame};
use crate::error::CliError;

/// Run the classify command.
pub fn run(image: &Path, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let frame = load_frame(image)?;

    let client = ReqwestClient::with_timeout(config.classifier.timeout)?;
    let classifier = OpenAiClassifier::from_env(
        client,
        config.classifier.to_classifier_config(),
        &config.classifier.api_key_env,
    )?;

    println!(
        "Classifying {} with {} ({} rules)...",
        image.display(),
        config.classifier.model,
        config.classifier.municipality
    );
    let components = classifier.classify(&frame)?;

    if components.is_empty() {
        println!("No components recognised.");
        return Ok(());
    }

    println!();
    println!("{:<24} {:<24} {:<8} {}", "COMPONENT", "MATERIAL", "RESIN", "CATEGORY");
    for component in &components {
        println!(
            "{:<24} {:<24} {:<8} {}",
            component.component_name,
            component.material,
            component.recycling_number.as_deref().unwrap_or("-"),
            component.disposable_category
        );
    }

    let expected = ExpectedItems::from_components(&components, &IgnoreList::new(&config.tracking.ignore));
    println!();
    if expected.is_empty() {
        println!("Nothing to sort after applying the ignore list.");
    } else {
        println!("Expected bins:");
        for item in expected.iter() {
            println!("  {} -> {}", item.display_name, item.expected_bin);
        }
    }
    Ok(())
}
