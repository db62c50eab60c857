//! Interactive service selection.

use std::io::{self, BufRead, Write};

use clara_common::catalog::{Catalog, Choice, Selection};

use crate::style::{self, CYAN, GREEN, RESET, WHITE, YELLOW};

/// Shows the service menu and asks until at least one service is chosen.
///
/// Returns `None` if the input ends before a valid answer, which the
/// caller treats as cancellation.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub fn select_services<R: BufRead, W: Write>(
    catalog: &Catalog,
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<Selection>> {
    writeln!(out, "{}", style::section_header("SERVICE SELECTION"))?;
    writeln!(out, "{WHITE}Please select which services you want to deploy:{RESET}\n")?;
    for (i, svc) in catalog.services().iter().enumerate() {
        writeln!(
            out,
            "{CYAN}   [{}] {:<15} {WHITE}- {} (Port {}){RESET}",
            i + 1,
            svc.name,
            svc.description,
            svc.port
        )?;
    }
    writeln!(out, "{CYAN}   [A] All Services     {WHITE}- Deploy everything (Recommended){RESET}\n")?;

    let mut selection = Selection::none(catalog);
    loop {
        write!(out, "{YELLOW}Select services (e.g., 1,3 or A for all): {RESET}")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(None);
        }

        let choice = Choice::parse(&line);
        selection.apply(&choice);
        match choice {
            Choice::Empty => writeln!(out, "{}", style::error("Please enter a selection."))?,
            Choice::All => {
                writeln!(out, "{}", style::info("All services selected for deployment"))?;
                break;
            }
            Choice::Indices(_) if selection.any() => break,
            Choice::Indices(_) => writeln!(
                out,
                "{}",
                style::error("No valid services selected. Please try again.")
            )?,
        }
    }

    writeln!(out, "\n{WHITE}Selected services:{RESET}")?;
    for svc in catalog.selected(&selection) {
        writeln!(out, "{GREEN}  ✓ {}{RESET}", svc.name)?;
    }
    writeln!(out)?;
    tracing::info!(count = selection.count(), "services selected");
    Ok(Some(selection))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn run(input: &str) -> (Option<Selection>, String) {
        let catalog = Catalog::builtin();
        let mut out = Vec::new();
        let selection = select_services(&catalog, &mut Cursor::new(input), &mut out).unwrap();
        (selection, String::from_utf8(out).unwrap())
    }

    #[test]
    fn lists_every_service_with_port() {
        let (_, out) = run("a\n");
        assert!(out.contains("[1] ComfyUI"));
        assert!(out.contains("(Port 5001)"));
        assert!(out.contains("[A] All Services"));
    }

    #[test]
    fn wildcard_selects_everything() {
        let (selection, out) = run("A\n");
        assert_eq!(selection.unwrap().count(), 3);
        assert!(out.contains("All services selected for deployment"));
    }

    #[test]
    fn explicit_digits_select_subset() {
        let catalog = Catalog::builtin();
        let (selection, out) = run("1,3\n");
        let ids: Vec<String> = catalog
            .selected_ids(&selection.unwrap())
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, vec!["clara_comfyui", "clara_n8n"]);
        assert!(out.contains("✓ ComfyUI"));
        assert!(!out.contains("✓ Python Backend"));
    }

    #[test]
    fn empty_input_reprompts() {
        let (selection, out) = run("\n2\n");
        assert_eq!(selection.unwrap().count(), 1);
        assert!(out.contains("Please enter a selection."));
        assert_eq!(out.matches("Select services (e.g.").count(), 2);
    }

    #[test]
    fn out_of_range_input_reprompts() {
        let (selection, out) = run("7,9\n3\n");
        let selection = selection.unwrap();
        assert!(selection.is_selected(2));
        assert_eq!(selection.count(), 1);
        assert!(out.contains("No valid services selected. Please try again."));
    }

    #[test]
    fn end_of_input_cancels() {
        let (selection, _) = run("");
        assert!(selection.is_none());
    }

    #[test]
    fn end_of_input_after_invalid_answer_cancels() {
        let (selection, _) = run("x\n");
        assert!(selection.is_none());
    }
}
