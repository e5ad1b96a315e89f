use mailpiece::{
    AccountType, ConstraintTrace, Package, Rate, ResponseError, ResponseErrorKind, TrackingEvent, TrackingResponse,
};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

fn section(title: &str, palette: &ansi::Palette) {
    println!("\n{}", palette.paint(format!("━━━ {} ━━━", title), ansi::GRAY));
}

fn dollars(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

pub fn print_constraints(sentence: &str, trace: &ConstraintTrace, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Sentence: \"{}\"", sentence), ansi::CYAN)));
    if trace.normalized != sentence {
        println!("   {} {}", palette.dim("normalized:"), trace.normalized);
    }

    section("Active rules", &palette);
    if trace.active_rules.is_empty() {
        println!("{}", palette.dim("  No rule passed the trigger scan"));
    }
    for name in &trace.active_rules {
        let marker = if Some(*name) == trace.rule { palette.paint("✓", ansi::GREEN) } else { palette.dim("·") };
        println!("  {} {}", marker, palette.paint(name, ansi::BLUE));
    }

    section("Result", &palette);
    match &trace.result {
        Ok(parsed) => {
            for (idx, interpretation) in parsed.iter().enumerate() {
                println!(
                    "  {} {} {}",
                    palette.paint(format!("[{}]", idx), ansi::GRAY),
                    palette.bold(palette.paint(interpretation.constraints.to_string(), ansi::GREEN)),
                    interpretation.label.map(|l| palette.dim(format!("│ {}", l))).unwrap_or_default(),
                );
            }
        }
        Err(err) => {
            println!("  {}", palette.paint(err.to_string(), ansi::RED));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • No trigger feature for the grammar (check inch marks, axis words)");
            println!("  • Regex patterns didn't match");
            println!("  • Production functions returned None");
        }
    }
    println!();
}

pub fn print_event(line: &str, event: Option<&TrackingEvent>, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Line: \"{}\"", line), ansi::CYAN)));

    section("Event", &palette);
    match event {
        Some(event) => print_event_row(0, event, &palette),
        None => println!("{}", palette.dim("  No narration rule matched")),
    }
    println!();
}

fn print_event_row(idx: usize, event: &TrackingEvent, palette: &ansi::Palette) {
    println!(
        "  {} {} {} {}",
        palette.paint(format!("[{}]", idx), ansi::GRAY),
        palette.paint(event.time.format("%Y-%m-%d %H:%M").to_string(), ansi::YELLOW),
        palette.bold(palette.paint(&event.description, ansi::GREEN)),
        palette.dim(format!("│ {}", event.status())),
    );
    if !event.location.is_empty() {
        println!("      {} {}", palette.dim("at:"), palette.paint(event.location.to_string(), ansi::BLUE));
    }
}

pub fn print_rates(rates: &[Rate], packages: &[Package], account: AccountType, color: bool) {
    let palette = ansi::Palette::new(color);
    println!(
        "\n{}",
        palette.bold(palette.paint(format!("⚙  Rates ({:?}, {} package(s))", account, packages.len()), ansi::CYAN))
    );

    for (idx, package) in packages.iter().enumerate() {
        println!(
            "   {} {}  {} {}",
            palette.dim(format!("package {}:", idx)),
            package,
            palette.dim("size:"),
            package.size_code()
        );
    }

    section("Services", &palette);
    if rates.is_empty() {
        println!("{}", palette.dim("  No service accepts every package"));
    }
    for rate in rates {
        let price = if rate.price == 0 { palette.dim(dollars(0)) } else { palette.bold(palette.paint(dollars(rate.price), ansi::GREEN)) };
        println!(
            "  {:>10} {} {}",
            price,
            palette.paint(&rate.service_name, ansi::BLUE),
            palette.dim(format!("│ code {}", rate.service_code)),
        );
        if rate.package_rates.len() > 1 {
            let split: Vec<String> = rate.package_rates.iter().map(|cents| dollars(*cents)).collect();
            println!("             {}", palette.dim(split.join(" + ")));
        }
    }
    println!();
}

pub fn print_tracking(response: &TrackingResponse, color: bool) {
    let palette = ansi::Palette::new(color);
    println!(
        "\n{}",
        palette.bold(palette.paint(format!("⚙  Tracking: {}", response.tracking_number), ansi::CYAN))
    );
    println!(
        "   {} {}{}",
        palette.dim("status:"),
        palette.paint(response.status.to_string(), if response.delivered { ansi::GREEN } else { ansi::YELLOW }),
        response
            .actual_delivery_date
            .map(|at| palette.dim(format!("  (delivered {})", at.format("%Y-%m-%d %H:%M"))))
            .unwrap_or_default(),
    );

    section("Events", &palette);
    if response.events.is_empty() {
        println!("{}", palette.dim("  No events"));
    }
    for (idx, event) in response.events.iter().enumerate() {
        print_event_row(idx, event, &palette);
    }
    println!();
}

pub fn print_error(err: &ResponseError, verbose: bool, color: bool) {
    let palette = ansi::Palette::new(color);
    let kind = match &err.kind {
        ResponseErrorKind::Vendor { number: Some(number) } => format!("vendor error {}", number),
        ResponseErrorKind::Vendor { number: None } => "vendor error".to_string(),
        ResponseErrorKind::NotFound => "not found".to_string(),
        ResponseErrorKind::Malformed => "malformed response".to_string(),
        ResponseErrorKind::UnknownRoot => "unknown response".to_string(),
        ResponseErrorKind::InvalidMailType => "invalid request".to_string(),
    };

    eprintln!("\n{} {}", palette.bold(palette.paint(format!("✗ {}:", kind), ansi::RED)), err.message);
    if verbose {
        eprintln!("\n{}", palette.paint("━━━ Response ━━━", ansi::GRAY));
        eprintln!("{}", palette.dim(err.response.trim()));
    }
    eprintln!();
}
