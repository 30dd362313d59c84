//! # Terminal Front End
//!
//! A line-oriented front end for the student tracker. [`TerminalPresenter`]
//! prints tables, statistics and notifications; [`TerminalShell`] reads one
//! command per line and drives the [`StudentController`].
//!
//! Values containing spaces are quoted: `add name="Omar Haddad" grade="Grade 5"`.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use log::{debug, warn};
use shared::{
    FilterCriteria, NotificationSeverity, StudentFormInput, StudentRecord, StudentStatistics,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::backend::domain::{StatisticsService, StudentTableService};
use crate::backend::io::{Presenter, StudentController};
use crate::backend::storage::Connection;

const HELP_TEXT: &str = "\
Commands:
  list                              show the filtered table
  add key=value ...                 add a student (name, grade, date, plan, status, amount, gender)
  edit <id>                         load a student into the form
  set key=value ...                 change form fields
  save                              submit the form
  form                              show the form
  cancel                            cancel the current edit, delete or clear
  delete <id>                       delete a student (asks for confirmation)
  confirm                           confirm a pending delete or clear
  toggle <id>                       advance the payment status
  filter key=value ...              search, status, type, month
  reset                             reset all filters
  stats                             show statistics
  amount <text>                     normalize an amount as typed
  inc <amount> / dec <amount>       step an amount up or down
  export [directory]                export every record as JSON
  clear                             delete all data (asks for confirmation)
  help                              show this text
  quit                              exit";

/// Prints everything the controller renders to a writer
pub struct TerminalPresenter<W: Write> {
    out: W,
    table_service: StudentTableService,
    statistics_service: StatisticsService,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            table_service: StudentTableService::new(),
            statistics_service: StatisticsService::new(),
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Write one line. Output failures are logged and otherwise ignored.
    pub fn print(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!("⚠️ TERMINAL: Failed to write output: {}", e);
        }
    }

    fn print_form(&mut self, form: &StudentFormInput) {
        let plan = form
            .payment_plan
            .map(|plan| plan.label())
            .unwrap_or_else(|| "(none)".to_string());
        let text = format!(
            "Form:\n  name:   {}\n  grade:  {}\n  date:   {}\n  plan:   {}\n  status: {}\n  amount: {}\n  gender: {:?}",
            form.full_name,
            form.grade,
            form.registration_date,
            plan,
            form.payment_status.label(),
            form.amount_input,
            form.gender,
        );
        self.print(&text);
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render_table(&mut self, records: &[StudentRecord]) {
        let rows = self.table_service.format_rows(records);
        let mut text = String::from(
            "#  | ID | Name | Grade | Gender | Registered | Plan | Amount | Total | Status | Last updated",
        );
        for row in rows {
            text.push_str(&format!(
                "\n{} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {}",
                row.row_number,
                row.id,
                row.full_name,
                row.grade,
                row.gender_symbol,
                row.formatted_registration_date,
                row.plan_label,
                row.formatted_amount,
                row.formatted_total,
                row.status_label,
                row.formatted_last_updated,
            ));
        }
        self.print(&text);
    }

    fn render_empty_state(&mut self) {
        self.print("No students to show.");
    }

    fn render_stats(&mut self, stats: &StudentStatistics) {
        let text = format!(
            "Students: {}  Paid: {}  Partial: {}  Unpaid: {}  Total payments: {}",
            stats.total,
            stats.paid_count,
            stats.partial_count,
            stats.unpaid_count,
            self.statistics_service.format_total_payments(stats),
        );
        self.print(&text);
    }

    fn notify(&mut self, message: &str, severity: NotificationSeverity) {
        let tag = match severity {
            NotificationSeverity::Info => "[info]",
            NotificationSeverity::Success => "[ok]",
            NotificationSeverity::Error => "[error]",
        };
        self.print(&format!("{} {}", tag, message));
    }
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Help,
    List,
    Add(Vec<(String, String)>),
    Edit(String),
    Set(Vec<(String, String)>),
    Save,
    Form,
    Cancel,
    Delete(String),
    Confirm,
    Toggle(String),
    Filter(Vec<(String, String)>),
    Reset,
    Stats,
    Amount(String),
    Increment(String),
    Decrement(String),
    Export(Option<PathBuf>),
    Clear,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellOutcome {
    Continue,
    Quit,
}

/// Split a line on whitespace, keeping double-quoted runs together
pub fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err("Unterminated quote".to_string());
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_pairs(tokens: &[String]) -> Result<Vec<(String, String)>, String> {
    tokens
        .iter()
        .map(|token| {
            token
                .split_once('=')
                .map(|(key, value)| (key.trim().to_lowercase(), value.to_string()))
                .ok_or_else(|| format!("Expected key=value, got: {}", token))
        })
        .collect()
}

fn single_argument(name: &str, tokens: &[String]) -> Result<String, String> {
    match tokens {
        [value] => Ok(value.clone()),
        _ => Err(format!("Usage: {} <value>", name)),
    }
}

/// Parse one input line. Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let tokens = tokenize(line)?;
    let Some((name, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match name.to_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "list" | "ls" => ShellCommand::List,
        "add" => ShellCommand::Add(parse_pairs(args)?),
        "edit" => ShellCommand::Edit(single_argument("edit", args)?),
        "set" => ShellCommand::Set(parse_pairs(args)?),
        "save" => ShellCommand::Save,
        "form" => ShellCommand::Form,
        "cancel" => ShellCommand::Cancel,
        "delete" | "rm" => ShellCommand::Delete(single_argument("delete", args)?),
        "confirm" | "yes" => ShellCommand::Confirm,
        "toggle" => ShellCommand::Toggle(single_argument("toggle", args)?),
        "filter" => ShellCommand::Filter(parse_pairs(args)?),
        "reset" => ShellCommand::Reset,
        "stats" => ShellCommand::Stats,
        "amount" => ShellCommand::Amount(args.join(" ")),
        "inc" => ShellCommand::Increment(args.join(" ")),
        "dec" => ShellCommand::Decrement(args.join(" ")),
        "export" => match args {
            [] => ShellCommand::Export(None),
            [dir] => ShellCommand::Export(Some(PathBuf::from(dir))),
            _ => return Err("Usage: export [directory]".to_string()),
        },
        "clear" => ShellCommand::Clear,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("Unknown command: {} (type 'help')", other)),
    };
    Ok(Some(command))
}

/// Apply `key=value` pairs to a form. Amounts are normalized as they are set.
fn apply_form_fields<C: Connection, W: Write>(
    controller: &StudentController<C, TerminalPresenter<W>>,
    form: &mut StudentFormInput,
    fields: &[(String, String)],
) -> Result<(), String> {
    for (key, value) in fields {
        match key.as_str() {
            "name" => form.full_name = value.clone(),
            "grade" => form.grade = value.clone(),
            "date" => form.registration_date = value.clone(),
            "plan" => form.payment_plan = Some(value.parse()?),
            "status" => form.payment_status = value.parse()?,
            "amount" => form.amount_input = controller.normalize_amount(value),
            "gender" => form.gender = value.parse()?,
            other => return Err(format!("Unknown form field: {}", other)),
        }
    }
    Ok(())
}

fn apply_filter_fields(criteria: &mut FilterCriteria, fields: &[(String, String)]) -> Result<(), String> {
    for (key, value) in fields {
        match key.as_str() {
            "search" => criteria.search_text = value.clone(),
            "status" => criteria.payment_status = value.parse()?,
            "type" => criteria.payment_type = value.parse()?,
            "month" => criteria.month = value.parse()?,
            other => return Err(format!("Unknown filter: {}", other)),
        }
    }
    Ok(())
}

/// Reads commands and forwards them to the controller
pub struct TerminalShell<C: Connection, W: Write> {
    controller: StudentController<C, TerminalPresenter<W>>,
    form: StudentFormInput,
    pending_clear: bool,
}

impl<C: Connection, W: Write> TerminalShell<C, W> {
    pub fn new(controller: StudentController<C, TerminalPresenter<W>>, today: NaiveDate) -> Self {
        let form = controller.blank_form(today);
        Self {
            controller,
            form,
            pending_clear: false,
        }
    }

    pub fn controller(&self) -> &StudentController<C, TerminalPresenter<W>> {
        &self.controller
    }

    pub fn form(&self) -> &StudentFormInput {
        &self.form
    }

    /// Process lines until `quit` or end of input
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        self.controller.presenter_mut().print("Type 'help' for commands.");
        for line in input.lines() {
            let line = line?;
            let today = Local::now().date_naive();
            if self.handle_line(&line, today) == ShellOutcome::Quit {
                break;
            }
        }
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str, today: NaiveDate) -> ShellOutcome {
        match parse_command(line) {
            Ok(Some(command)) => {
                debug!("Terminal command: {:?}", command);
                self.execute(command, today)
            }
            Ok(None) => ShellOutcome::Continue,
            Err(message) => {
                self.controller
                    .presenter_mut()
                    .notify(&message, NotificationSeverity::Error);
                ShellOutcome::Continue
            }
        }
    }

    pub fn execute(&mut self, command: ShellCommand, today: NaiveDate) -> ShellOutcome {
        match command {
            ShellCommand::Help => self.controller.presenter_mut().print(HELP_TEXT),
            ShellCommand::List => self.controller.refresh(),
            ShellCommand::Add(fields) => {
                if self.controller.editing_id().is_some() {
                    self.report("Finish or cancel the current edit first");
                } else {
                    let mut form = self.controller.blank_form(today);
                    match apply_form_fields(&self.controller, &mut form, &fields) {
                        Ok(()) => {
                            if self.controller.submit_record(&form).is_ok() {
                                self.form = self.controller.blank_form(today);
                            }
                        }
                        Err(message) => self.report(&message),
                    }
                }
            }
            ShellCommand::Edit(id) => match self.controller.request_edit(&id) {
                Some(form) => {
                    self.form = form;
                    let form = self.form.clone();
                    self.controller.presenter_mut().print_form(&form);
                }
                None => self.report(&format!("No student with id {}", id)),
            },
            ShellCommand::Set(fields) => {
                let mut form = self.form.clone();
                match apply_form_fields(&self.controller, &mut form, &fields) {
                    Ok(()) => self.form = form,
                    Err(message) => self.report(&message),
                }
            }
            ShellCommand::Save => {
                let form = self.form.clone();
                if self.controller.submit_record(&form).is_ok() {
                    self.form = self.controller.blank_form(today);
                }
            }
            ShellCommand::Form => {
                let form = self.form.clone();
                self.controller.presenter_mut().print_form(&form);
            }
            ShellCommand::Cancel => {
                if self.pending_clear {
                    self.pending_clear = false;
                } else if self.controller.pending_delete_id().is_some() {
                    self.controller.cancel_delete();
                } else {
                    self.controller.cancel_edit();
                    self.form = self.controller.blank_form(today);
                }
                self.controller.presenter_mut().print("Cancelled.");
            }
            ShellCommand::Delete(id) => match self.controller.request_delete(&id) {
                Some(prompt) => {
                    self.pending_clear = false;
                    self.controller
                        .presenter_mut()
                        .print(&format!("{} Type 'confirm' or 'cancel'.", prompt));
                }
                None => self.report(&format!("No student with id {}", id)),
            },
            ShellCommand::Confirm => {
                if self.pending_clear {
                    self.pending_clear = false;
                    self.controller.clear_all();
                    self.form = self.controller.blank_form(today);
                } else if self.controller.pending_delete_id().is_some() {
                    let was_editing = self.controller.editing_id().is_some();
                    self.controller.confirm_delete();
                    if was_editing && self.controller.editing_id().is_none() {
                        self.form = self.controller.blank_form(today);
                    }
                } else {
                    self.report("Nothing to confirm");
                }
            }
            ShellCommand::Toggle(id) => self.controller.toggle_status(&id),
            ShellCommand::Filter(fields) => {
                let mut criteria = self.controller.criteria().clone();
                match apply_filter_fields(&mut criteria, &fields) {
                    Ok(()) => self.controller.change_filter(criteria),
                    Err(message) => self.report(&message),
                }
            }
            ShellCommand::Reset => self.controller.reset_filters(today),
            ShellCommand::Stats => {
                let stats = self.controller.statistics();
                self.controller.presenter_mut().render_stats(&stats);
            }
            ShellCommand::Amount(text) => {
                let normalized = self.controller.normalize_amount(&text);
                self.controller.presenter_mut().print(&normalized);
            }
            ShellCommand::Increment(text) => {
                let stepped = self.controller.increment_amount(&text);
                self.controller.presenter_mut().print(&stepped);
            }
            ShellCommand::Decrement(text) => {
                let stepped = self.controller.decrement_amount(&text);
                self.controller.presenter_mut().print(&stepped);
            }
            ShellCommand::Export(directory) => {
                if let Some(response) = self.controller.export(directory.as_deref(), today) {
                    if response.success {
                        self.controller.presenter_mut().print(&response.message);
                    }
                }
            }
            ShellCommand::Clear => {
                self.pending_clear = true;
                self.controller.cancel_delete();
                self.controller
                    .presenter_mut()
                    .print("Delete ALL student data? This cannot be undone. Type 'confirm' or 'cancel'.");
            }
            ShellCommand::Quit => return ShellOutcome::Quit,
        }
        ShellOutcome::Continue
    }

    fn report(&mut self, message: &str) {
        self.controller
            .presenter_mut()
            .notify(message, NotificationSeverity::Error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::{MemoryConnection, TrackerConfig};
    use crate::backend::Backend;
    use shared::{MonthFilter, PaymentPlan, PaymentStatus, PaymentTypeFilter, StatusFilter};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn shell() -> TerminalShell<MemoryConnection, Vec<u8>> {
        let connection = MemoryConnection::new();
        let config = TrackerConfig {
            reset_month_to_current: false,
            ..TrackerConfig::default()
        };
        let backend = Backend::new(&connection, config);
        let mut controller = StudentController::new(backend, TerminalPresenter::new(Vec::new()));
        controller.start(today());
        TerminalShell::new(controller, today())
    }

    fn output(shell: &TerminalShell<MemoryConnection, Vec<u8>>) -> String {
        String::from_utf8_lossy(shell.controller().presenter().writer()).to_string()
    }

    const ADD_OMAR: &str =
        r#"add name="Omar Haddad" grade="Grade 5" date=2024-06-01 plan=3 amount=1,500 gender=male"#;

    #[test]
    fn test_tokenize_keeps_quoted_values_together() {
        let tokens = tokenize(r#"add name="Omar Haddad" grade=7"#).unwrap();
        assert_eq!(tokens, vec!["add", "name=Omar Haddad", "grade=7"]);
        assert_eq!(tokenize("   ").unwrap(), Vec::<String>::new());
        assert_eq!(tokenize(r#"search="""#).unwrap(), vec!["search="]);
        assert!(tokenize(r#"add name="Omar"#).is_err());
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("toggle 42").unwrap(), Some(ShellCommand::Toggle("42".to_string())));
        assert_eq!(parse_command("export").unwrap(), Some(ShellCommand::Export(None)));
        assert_eq!(
            parse_command("filter status=paid").unwrap(),
            Some(ShellCommand::Filter(vec![("status".to_string(), "paid".to_string())]))
        );
        assert!(parse_command("toggle").is_err());
        assert!(parse_command("filter paid").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_add_and_list() {
        let mut shell = shell();

        shell.handle_line(ADD_OMAR, today());

        let records = shell.controller().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payment_months, PaymentPlan::Months(3));
        assert_eq!(records[0].total_payment, 4500.0);
        let out = output(&shell);
        assert!(out.contains("Omar Haddad | Grade 5 | ♂ | 1/6/2024 | 3 months | 1,500.00 | 4,500.00 | Paid in full"));
        assert!(out.contains("Total payments: 4,500.00"));
        assert!(out.contains("[ok] Student added successfully"));
    }

    #[test]
    fn test_add_with_missing_plan_reports_error() {
        let mut shell = shell();

        shell.handle_line(r#"add name=Omar grade=5 amount=10"#, today());

        assert!(shell.controller().records().is_empty());
        assert!(output(&shell).contains("[error] Please choose the number of payment months"));
    }

    #[test]
    fn test_edit_set_save() {
        let mut shell = shell();
        shell.handle_line(ADD_OMAR, today());
        let id = shell.controller().records()[0].id.clone();

        shell.handle_line(&format!("edit {}", id), today());
        assert_eq!(shell.form().full_name, "Omar Haddad");
        shell.handle_line("set status=partial amount=2000", today());
        shell.handle_line("save", today());

        let record = &shell.controller().records()[0];
        assert_eq!(record.id, id);
        assert_eq!(record.payment_status_value, PaymentStatus::Partial);
        assert_eq!(record.total_payment, 6000.0);
        assert_eq!(shell.controller().editing_id(), None);
        assert_eq!(shell.form().full_name, "");
    }

    #[test]
    fn test_add_blocked_while_editing() {
        let mut shell = shell();
        shell.handle_line(ADD_OMAR, today());
        let id = shell.controller().records()[0].id.clone();
        shell.handle_line(&format!("edit {}", id), today());

        shell.handle_line(r#"add name=Lina grade=5 plan=1 amount=10"#, today());

        assert_eq!(shell.controller().records().len(), 1);
        assert!(output(&shell).contains("Finish or cancel the current edit first"));
    }

    #[test]
    fn test_delete_then_cancel_then_confirm() {
        let mut shell = shell();
        shell.handle_line(ADD_OMAR, today());
        let id = shell.controller().records()[0].id.clone();

        shell.handle_line(&format!("delete {}", id), today());
        shell.handle_line("cancel", today());
        shell.handle_line("confirm", today());
        assert_eq!(shell.controller().records().len(), 1);

        shell.handle_line(&format!("delete {}", id), today());
        shell.handle_line("confirm", today());
        assert!(shell.controller().records().is_empty());
        assert!(output(&shell).contains("No students to show."));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut shell = shell();
        shell.handle_line(ADD_OMAR, today());

        shell.handle_line("clear", today());
        assert_eq!(shell.controller().records().len(), 1);
        shell.handle_line("confirm", today());

        assert!(shell.controller().records().is_empty());
        assert!(output(&shell).contains("[ok] All data cleared successfully"));
    }

    #[test]
    fn test_filter_and_reset() {
        let mut shell = shell();
        shell.handle_line(ADD_OMAR, today());

        shell.handle_line("filter status=unpaid type=monthly month=6", today());
        assert_eq!(
            shell.controller().criteria(),
            &FilterCriteria {
                search_text: String::new(),
                payment_status: StatusFilter::Unpaid,
                payment_type: PaymentTypeFilter::Monthly,
                month: MonthFilter::Month(6),
            }
        );

        shell.handle_line("reset", today());
        assert_eq!(shell.controller().criteria(), &FilterCriteria::default());

        shell.handle_line("filter month=13", today());
        assert!(output(&shell).contains("[error] Month must be 'all' or 1-12"));
    }

    #[test]
    fn test_toggle_and_amount_helpers() {
        let mut shell = shell();
        shell.handle_line(ADD_OMAR, today());
        let id = shell.controller().records()[0].id.clone();

        shell.handle_line(&format!("toggle {}", id), today());
        shell.handle_line("amount 1234.567", today());
        shell.handle_line("inc 95", today());

        assert_eq!(shell.controller().records()[0].payment_status_value, PaymentStatus::Unpaid);
        let out = output(&shell);
        assert!(out.contains("Payment status changed to Unpaid"));
        assert!(out.contains("\n1,234.56\n"));
        assert!(out.contains("\n105.00\n"));
    }

    #[test]
    fn test_export_to_directory() {
        let mut shell = shell();
        shell.handle_line(ADD_OMAR, today());
        let temp_dir = TempDir::new().unwrap();

        shell.handle_line(&format!("export \"{}\"", temp_dir.path().display()), today());

        assert!(temp_dir.path().join("students_2024-06-15.json").exists());
    }

    #[test]
    fn test_run_stops_at_quit() {
        let mut shell = shell();
        let input = Cursor::new(format!("{}\nquit\n{}\n", ADD_OMAR, ADD_OMAR));

        shell.run(input).unwrap();

        assert_eq!(shell.controller().records().len(), 1);
    }
}
