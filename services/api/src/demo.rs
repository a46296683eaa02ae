use crate::infra::{cli_config, load_dataset};
use chrono::Local;
use clap::Args;
use dealer_csi::error::AppError;
use dealer_csi::workflows::feed::SurveyFeed;
use dealer_csi::workflows::survey::export::write_customer_csv;
use dealer_csi::workflows::survey::report::views::{
    CustomerRowView, SurveyInsights, SurveyReportSummary,
};
use dealer_csi::workflows::survey::router::SurveyReportResponse;
use dealer_csi::workflows::survey::{AggregationFilter, Selection, SurveyReport};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const DEMO_FEED: &str = r#"{
  "questions": {
    "Field_1": "Explanation of vehicle features at delivery",
    "Field_2": "Cleanliness of the vehicle",
    "Field_3": "Delivered on the promised date",
    "Field_4": "Courtesy of the delivery advisor"
  },
  "averages": {
    "Field_5": "Follow-up call after delivery"
  },
  "customers": [
    {
      "contact": { "displayName": "Sara Ahmadi", "phoneNumber": "09121110001" },
      "fields": { "Field_1": 10, "Field_2": 9, "Field_3": 10, "Field_4": 10, "Field_Comment": "Very smooth handover" },
      "description": "<p>نام خودرو: X200</p><p>رنگ خودرو: سفید</p><p>شماره شاسی: NAS411100012</p>",
      "deliveryYear": "1403", "deliveryMonth": 2,
      "pipelineChangeTime": "2024-05-02T10:15:00Z"
    },
    {
      "contact": { "displayName": "Reza Karimi", "phoneNumber": "09121110002" },
      "fields": { "Field_1": 6, "Field_2": 5, "Field_3": 4, "Field_5": 7, "Field_Comment": "Delivery slipped by a week" },
      "description": "نام خودرو: Tiggo 8<br>رنگ خودرو: مشکی<br>تاریخ تحویل: 1403/02/18",
      "deliveryYear": "1403", "deliveryMonth": 2,
      "pipelineChangeTime": "2024-05-09 16:40:00"
    },
    {
      "contact": { "displayName": "Neda Rahimi", "phoneNumber": "09121110003" },
      "fields": { "Field_1": 8, "Field_2": 8, "Field_3": 9, "Field_4": 7 },
      "description": "نام خودرو: Arrizo 6<br>رنگ خودرو: خاکستری",
      "deliveryYear": "1403", "deliveryMonth": 3,
      "deliveryDate": "1403/03/05"
    },
    {
      "contact": { "displayName": "QA Test", "phoneNumber": "09120000000" },
      "fields": { "Field_1": 0, "Field_2": 0 },
      "description": "test record",
      "deliveryYear": "1403", "deliveryMonth": 3,
      "ignore": true
    },
    {
      "contact": { "displayName": "Hamid Sadeghi", "phoneNumber": "09121110005" },
      "fields": { "Field_1": 3, "Field_3": 2, "Field_4": 5, "Field_Comment": "Car was not washed" },
      "description": "نام خودرو: X200<br>رنگ خودرو: قرمز",
      "deliveryYear": "1402", "deliveryMonth": 12
    }
  ],
  "inProgress": [
    {
      "contact": { "displayName": "Leila Moradi", "phoneNumber": "09121110006" },
      "fields": { "Field_1": 9 },
      "deliveryYear": "1403", "deliveryMonth": 3
    }
  ],
  "notAnswered": [
    {
      "contact": { "displayName": "Kian Jafari", "phoneNumber": "09121110007" },
      "deliveryYear": "1403", "deliveryMonth": 2
    },
    {
      "contact": { "displayName": "Parisa Nouri", "phoneNumber": "09121110008" },
      "deliveryYear": "1402", "deliveryMonth": 12
    }
  ]
}"#;

#[derive(Args, Debug)]
pub(crate) struct SurveyReportArgs {
    /// Survey feed JSON exported by the data service (`-` reads stdin)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Delivery year to report on, or `all`
    #[arg(long, default_value = "all")]
    pub(crate) year: Selection<String>,
    /// Delivery month (1-12) to report on, or `all`
    #[arg(long, default_value = "all", value_parser = crate::infra::parse_month)]
    pub(crate) month: Selection<u8>,
    /// Leave out responses flagged as test or duplicate data
    #[arg(long)]
    pub(crate) exclude_ignored: bool,
    /// Only keep completed surveys under the satisfaction threshold
    #[arg(long)]
    pub(crate) dissatisfied_only: bool,
    /// Also write the completed customer rows to a CSV file
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
    /// Include a per-customer listing in the text output
    #[arg(long)]
    pub(crate) list_customers: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SurveyFiltersArgs {
    /// Survey feed JSON exported by the data service (`-` reads stdin)
    #[arg(long)]
    pub(crate) input: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Delivery year for the filtered part of the demo, or `all`
    #[arg(long, default_value = "all")]
    pub(crate) year: Selection<String>,
    /// Include a per-customer listing in the output
    #[arg(long)]
    pub(crate) list_customers: bool,
    /// Write the demo's completed customer rows to a CSV file
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn run_survey_report(args: SurveyReportArgs) -> Result<(), AppError> {
    let SurveyReportArgs {
        input,
        year,
        month,
        exclude_ignored,
        dissatisfied_only,
        csv,
        json,
        list_customers,
    } = args;

    let config = cli_config()?;
    let dataset = load_dataset(&input)?;
    let filter = AggregationFilter {
        year,
        month,
        exclude_ignored,
        dissatisfied_only,
    };

    let report = SurveyReport::build(&dataset, &filter, &config.survey);
    let summary = report.summary();
    let insights = summary.insights();

    if let Some(path) = csv {
        export_customers(&summary.completed, &path)?;
    }

    if json {
        let response = SurveyReportResponse { summary, insights };
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Report payload unavailable: {err}"),
        }
    } else {
        render_survey_report(&summary, &insights, list_customers);
    }

    Ok(())
}

pub(crate) fn run_survey_filters(args: SurveyFiltersArgs) -> Result<(), AppError> {
    cli_config()?;
    let dataset = load_dataset(&args.input)?;

    let years = dataset.delivery_years();
    let months = dataset.delivery_months();
    println!(
        "Delivery years: {}",
        if years.is_empty() {
            "none".to_string()
        } else {
            years.join(", ")
        }
    );
    println!(
        "Delivery months: {}",
        if months.is_empty() {
            "none".to_string()
        } else {
            months
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }
    );

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        year,
        list_customers,
        csv,
    } = args;

    let config = cli_config()?;
    let dataset = SurveyFeed::from_json(DEMO_FEED)?;

    println!("Customer satisfaction demo");
    println!("Generated {}", Local::now().format("%Y-%m-%d %H:%M"));
    println!(
        "Feed: {} completed, {} in progress, {} not answered",
        dataset.customers.len(),
        dataset.in_progress.len(),
        dataset.not_answered.len()
    );
    println!("Delivery years on file: {}", dataset.delivery_years().join(", "));

    let everything = AggregationFilter::default();
    let report = SurveyReport::build(&dataset, &everything, &config.survey);
    let summary = report.summary();
    println!("\n== Unfiltered ==");
    render_survey_report(&summary, &summary.insights(), list_customers);

    let cleaned = AggregationFilter {
        year,
        exclude_ignored: true,
        ..AggregationFilter::default()
    };
    let report = SurveyReport::build(&dataset, &cleaned, &config.survey);
    let summary = report.summary();
    println!("\n== Without ignored records ==");
    render_survey_report(&summary, &summary.insights(), list_customers);

    let follow_up = AggregationFilter {
        dissatisfied_only: true,
        ..cleaned
    };
    let report = SurveyReport::build(&dataset, &follow_up, &config.survey);
    let summary = report.summary();
    println!("\n== Follow-up list ==");
    render_customers(&summary.completed);

    if let Some(path) = csv {
        export_customers(&summary.completed, &path)?;
        println!("\nFollow-up rows written to {}", path.display());
    }

    Ok(())
}

fn export_customers(rows: &[CustomerRowView], path: &Path) -> Result<(), AppError> {
    let file = File::create(path)?;
    write_customer_csv(rows, BufWriter::new(file))?;
    Ok(())
}

fn render_survey_report(
    summary: &SurveyReportSummary,
    insights: &SurveyInsights,
    list_customers: bool,
) {
    let filter = &summary.filter;
    println!(
        "Filter: year {}, month {}{}{}",
        filter.year,
        filter.month,
        if filter.exclude_ignored {
            ", ignored records excluded"
        } else {
            ""
        },
        if filter.dissatisfied_only {
            ", dissatisfied only"
        } else {
            ""
        }
    );

    println!("\nResponses");
    for entry in &summary.partition_counts {
        println!(
            "- {}: {} of {}",
            entry.partition_label, entry.filtered, entry.total
        );
    }

    match summary.overall_tier {
        Some(tier) => println!(
            "\nOverall satisfaction index: {:.2} ({})",
            summary.overall_index,
            tier.label()
        ),
        None => println!("\nOverall satisfaction index: no scored answers"),
    }

    if !summary.question_averages.is_empty() {
        println!("\nQuestion averages");
        for average in &summary.question_averages {
            println!(
                "- {} [{}]: {:.2} ({} response{})",
                average.label,
                average.key,
                average.score,
                average.responses,
                if average.responses == 1 { "" } else { "s" }
            );
        }
    }

    println!("\nSatisfaction distribution");
    for entry in summary.distribution.entries() {
        println!(
            "- {}: {} ({:.0}%)",
            entry.tier_label,
            entry.count,
            entry.share * 100.0
        );
    }

    println!("\nObservations");
    for observation in &insights.observations {
        println!("- {observation}");
    }

    if !insights.follow_up.is_empty() {
        println!("\nFollow up with");
        for line in &insights.follow_up {
            println!("- {line}");
        }
    }

    if list_customers {
        println!("\nCompleted surveys");
        render_customers(&summary.completed);
    }
}

fn render_customers(rows: &[CustomerRowView]) {
    if rows.is_empty() {
        println!("- none");
        return;
    }

    for row in rows {
        let score = row
            .score
            .map(|score| format!("{score:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let vehicle = if row.vehicle.is_empty() {
            "vehicle unknown".to_string()
        } else {
            format!("{} {}", row.vehicle.car_model, row.vehicle.color)
                .trim()
                .to_string()
        };
        println!(
            "- {} | {} | score {} | {} | {} | delivered {}",
            row.display_name,
            row.phone_number,
            score,
            row.tier_label.unwrap_or("-"),
            vehicle,
            if row.delivery_period.is_empty() {
                "-"
            } else {
                row.delivery_period.as_str()
            }
        );
        for comment in &row.comments {
            println!("    \"{comment}\"");
        }
    }
}
