use crate::score_bar;
use anyhow::Result;
use resumatch::display_timestamp;
use resumatch::models::{
    AnalysisResult, CoverLetter, CoverLetterPage, ResumePage, Score, ScoreBand, User,
};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout() -> StandardStream {
    StandardStream::stdout(if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    })
}

fn band_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Excellent | ScoreBand::Good => Color::Green,
        ScoreBand::Average => Color::Yellow,
        ScoreBand::NeedsImprovement => Color::Red,
    }
}

fn pp_score(
    stdout: &mut StandardStream,
    label: &str,
    score: Score,
    band: ScoreBand,
) -> Result<()> {
    write!(stdout, "{:<22}", label)?;
    stdout.set_color(ColorSpec::new().set_fg(Some(band_color(band))).set_bold(true))?;
    write!(stdout, "{:>4} {}", score.to_string(), score_bar(score.value(), 20))?;
    stdout.reset()?;
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(stdout, " {band}")?;
    stdout.reset()?;
    Ok(())
}

fn pp_heading(stdout: &mut StandardStream, heading: &str) -> Result<()> {
    stdout.set_color(ColorSpec::new().set_bold(true).set_underline(true))?;
    write!(stdout, "{heading}")?;
    stdout.reset()?;
    writeln!(stdout)?;
    Ok(())
}

fn pp_list(
    stdout: &mut StandardStream,
    heading: &str,
    items: &[String],
    empty: &str,
) -> Result<()> {
    pp_heading(stdout, heading)?;
    if items.is_empty() {
        stdout.set_color(ColorSpec::new().set_dimmed(true).set_italic(true))?;
        writeln!(stdout, "  {empty}")?;
        stdout.reset()?;
    }
    for item in items {
        writeln!(stdout, "  - {item}")?;
    }
    writeln!(stdout)?;
    Ok(())
}

pub fn pp_analysis(result: &AnalysisResult) -> Result<()> {
    let mut stdout = stdout();
    let analysis = &result.analysis;

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    write!(&mut stdout, "{:<54.54}", result.file_name)?;
    stdout.reset()?;
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(&mut stdout, "{}", display_timestamp(&result.uploaded_at))?;
    stdout.reset()?;

    let role = result.job_role.as_deref().or(analysis.role.as_deref());
    match (role, analysis.company_name.as_deref()) {
        (Some(role), Some(company)) => writeln!(&mut stdout, "{role} at {company}")?,
        (Some(role), None) => writeln!(&mut stdout, "{role}")?,
        (None, Some(company)) => writeln!(&mut stdout, "{company}")?,
        (None, None) => {}
    }
    writeln!(&mut stdout)?;

    pp_score(
        &mut stdout,
        "ATS score",
        analysis.ats_score,
        ScoreBand::for_analysis(analysis.ats_score),
    )?;
    pp_score(
        &mut stdout,
        "Job match",
        analysis.suitability_percentage,
        ScoreBand::for_analysis(analysis.suitability_percentage),
    )?;
    writeln!(&mut stdout)?;

    pp_list(
        &mut stdout,
        "Mistakes",
        &analysis.mistakes,
        "No significant mistakes found",
    )?;
    pp_list(
        &mut stdout,
        "Improvements",
        &analysis.improvements,
        "No suggestions",
    )?;
    pp_list(
        &mut stdout,
        "Missing skills",
        &analysis.missing_skills,
        "Your resume covers the required skills",
    )?;

    pp_heading(&mut stdout, "Keywords")?;
    if analysis.keywords.is_empty() {
        writeln!(&mut stdout, "  (none)")?;
    } else {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(&mut stdout, "  {}", analysis.keywords.join(", "))?;
        stdout.reset()?;
    }
    writeln!(&mut stdout)?;

    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(&mut stdout, "resume id: {}", result.resume_id)?;
    stdout.reset()?;
    Ok(())
}

pub fn pp_history(page: &ResumePage, page_num: u32) -> Result<()> {
    let mut stdout = stdout();

    if page.resumes.is_empty() {
        writeln!(&mut stdout, "No analyses yet. Upload a resume to get started.")?;
        return Ok(());
    }

    for entry in page.resumes.iter() {
        let score = entry.ats_score();
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(&mut stdout, "{:<40.40}", entry.file_name)?;
        stdout.reset()?;
        stdout.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(&mut stdout, "{}", display_timestamp(&entry.uploaded_at))?;
        stdout.reset()?;

        let role = entry.role().unwrap_or("General analysis");
        match entry.company() {
            Some(company) => writeln!(&mut stdout, "  {role} at {company}")?,
            None => writeln!(&mut stdout, "  {role}")?,
        }

        let band = ScoreBand::for_history(score);
        write!(&mut stdout, "  ATS ")?;
        stdout.set_color(ColorSpec::new().set_fg(Some(band_color(band))).set_bold(true))?;
        write!(&mut stdout, "{score} ({band})")?;
        stdout.reset()?;
        writeln!(&mut stdout, "  match {}", entry.suitability())?;

        let keywords = entry.keywords();
        if !keywords.is_empty() {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            let shown: Vec<&str> = keywords.iter().take(3).map(String::as_str).collect();
            write!(&mut stdout, "  {}", shown.join(", "))?;
            stdout.reset()?;
            if keywords.len() > 3 {
                write!(&mut stdout, " +{} more", keywords.len() - 3)?;
            }
            writeln!(&mut stdout)?;
        }

        stdout.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(&mut stdout, "  {}\n", entry.id().unwrap_or("-"))?;
        stdout.reset()?;
    }

    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(
        &mut stdout,
        "page {} of {} ({} total analyses)",
        page.pagination.current_page.unwrap_or(page_num),
        page.pagination.total_pages,
        page.pagination.total_items()
    )?;
    stdout.reset()?;
    Ok(())
}

pub fn pp_cover_letter(letter: &CoverLetter) -> Result<()> {
    let mut stdout = stdout();

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    let title = match (letter.job_role.as_deref(), letter.company_name.as_deref()) {
        (Some(role), Some(company)) => format!("{role} at {company}"),
        (Some(role), None) => role.to_string(),
        (None, Some(company)) => company.to_string(),
        (None, None) => "Cover letter".to_string(),
    };
    write!(&mut stdout, "{:<54.54}", title)?;
    stdout.reset()?;
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(&mut stdout, "{}", display_timestamp(&letter.generated_at))?;
    writeln!(
        &mut stdout,
        "tone: {}  length: {}  words: {}\n",
        letter.tone,
        letter.length,
        letter.word_count()
    )?;
    stdout.reset()?;

    writeln!(&mut stdout, "{}\n", letter.cover_letter_content.trim_end())?;

    if !letter.keywords.is_empty() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(&mut stdout, "{}", letter.keywords.join(", "))?;
        stdout.reset()?;
    }
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(&mut stdout, "cover letter id: {}", letter.cover_letter_id)?;
    stdout.reset()?;
    Ok(())
}

pub fn pp_cover_letters(page: &CoverLetterPage, page_num: u32) -> Result<()> {
    let mut stdout = stdout();

    if page.cover_letters.is_empty() {
        writeln!(&mut stdout, "No cover letters yet.")?;
        return Ok(());
    }
    for letter in page.cover_letters.iter() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(
            &mut stdout,
            "{:<40.40}",
            letter.company_name.as_deref().unwrap_or("(no company)")
        )?;
        stdout.reset()?;
        stdout.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(
            &mut stdout,
            "{}",
            letter
                .generated_at
                .as_deref()
                .map(display_timestamp)
                .unwrap_or_default()
        )?;
        stdout.reset()?;
        writeln!(
            &mut stdout,
            "  {}  ({}, {})",
            letter.job_role.as_deref().unwrap_or("-"),
            letter.tone.as_deref().unwrap_or("-"),
            letter.length.as_deref().unwrap_or("-"),
        )?;
        stdout.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(&mut stdout, "  {}\n", letter.id().unwrap_or("-"))?;
        stdout.reset()?;
    }
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(
        &mut stdout,
        "page {} of {} ({} total)",
        page.pagination.current_page.unwrap_or(page_num),
        page.pagination.total_pages,
        page.pagination.total_items()
    )?;
    stdout.reset()?;
    Ok(())
}

pub fn pp_user(user: &User) -> Result<()> {
    let mut stdout = stdout();
    stdout.set_color(ColorSpec::new().set_bold(true))?;
    write!(&mut stdout, "{}", user.name)?;
    stdout.reset()?;
    writeln!(&mut stdout, " <{}>", user.email)?;
    if let Some(id) = &user.id {
        stdout.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(&mut stdout, "user id: {id}")?;
        stdout.reset()?;
    }
    Ok(())
}
