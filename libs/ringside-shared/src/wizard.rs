//! Registration wizard: a strictly linear state machine that collects one
//! student's fields and yields a [`StudentRecord`] on the final step.
//!
//! The whole flow lives in [`TRANSITIONS`]; [`WizardSession::apply`] is the only
//! way a session moves. Cancel is accepted from every active step and always lands
//! in [`WizardStep::Idle`] with an empty draft.

use chrono::NaiveDate;

use crate::dates::{days_until, parse_amount, parse_date};
use crate::error::ValidationError;
use crate::models::StudentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WizardStep {
    #[default]
    Idle,
    AwaitingName,
    AwaitingPhone,
    AwaitingTelegramId,
    AwaitingMembershipType,
    AwaitingStartDate,
    AwaitingEndDate,
    AwaitingPayment,
}

/// `(from, to)` on valid input. `AwaitingPayment -> Idle` is the commit edge.
pub const TRANSITIONS: [(WizardStep, WizardStep); 8] = [
    (WizardStep::Idle, WizardStep::AwaitingName),
    (WizardStep::AwaitingName, WizardStep::AwaitingPhone),
    (WizardStep::AwaitingPhone, WizardStep::AwaitingTelegramId),
    (WizardStep::AwaitingTelegramId, WizardStep::AwaitingMembershipType),
    (WizardStep::AwaitingMembershipType, WizardStep::AwaitingStartDate),
    (WizardStep::AwaitingStartDate, WizardStep::AwaitingEndDate),
    (WizardStep::AwaitingEndDate, WizardStep::AwaitingPayment),
    (WizardStep::AwaitingPayment, WizardStep::Idle),
];

impl WizardStep {
    pub fn next(self) -> WizardStep {
        TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
            .unwrap_or(WizardStep::Idle)
    }

    pub fn is_active(self) -> bool {
        self != WizardStep::Idle
    }
}

/// Fields collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub telegram_id: Option<String>,
    pub membership_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Draft {
    /// Assembles the record. `days_left` is taken against `today` at this moment.
    pub fn finish(&self, payment_amount: i64, today: NaiveDate) -> Result<StudentRecord, ValidationError> {
        let start_date = self.start_date.ok_or(ValidationError::MissingField("start date"))?;
        let end_date = self.end_date.ok_or(ValidationError::MissingField("end date"))?;
        Ok(StudentRecord {
            full_name: self
                .full_name
                .clone()
                .ok_or(ValidationError::MissingField("name"))?,
            phone: self.phone.clone().ok_or(ValidationError::MissingField("phone"))?,
            telegram_id: self.telegram_id.clone(),
            days_left: days_until(end_date, today),
            membership_type: self
                .membership_type
                .clone()
                .ok_or(ValidationError::MissingField("membership type"))?,
            start_date,
            end_date,
            payment_amount,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardInput<'a> {
    Begin,
    Text(&'a str),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Moved to this step; its prompt should be shown.
    Prompt(WizardStep),
    /// Input rejected; the session stays on `step` with the draft untouched.
    Rejected {
        step: WizardStep,
        error: ValidationError,
    },
    /// Final field accepted. The session is already idle; the caller appends the record.
    Completed(StudentRecord),
    /// Session discarded.
    Cancelled,
    /// Nothing to do (text or cancel while idle).
    Ignored,
}

/// Per-user wizard progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardSession {
    pub step: WizardStep,
    pub draft: Draft,
}

impl WizardSession {
    pub fn is_active(&self) -> bool {
        self.step.is_active()
    }

    pub fn apply(&mut self, input: WizardInput<'_>, today: NaiveDate) -> Transition {
        match input {
            WizardInput::Begin => {
                *self = WizardSession {
                    step: WizardStep::Idle.next(),
                    draft: Draft::default(),
                };
                Transition::Prompt(self.step)
            }
            WizardInput::Cancel if self.is_active() => {
                *self = WizardSession::default();
                Transition::Cancelled
            }
            WizardInput::Cancel => Transition::Ignored,
            WizardInput::Text(_) if !self.is_active() => Transition::Ignored,
            WizardInput::Text(text) => self.accept(text, today),
        }
    }

    fn accept(&mut self, text: &str, today: NaiveDate) -> Transition {
        let text = text.trim();
        let stored = match self.step {
            WizardStep::Idle => return Transition::Ignored,
            WizardStep::AwaitingName => {
                self.draft.full_name = Some(text.to_string());
                Ok(())
            }
            WizardStep::AwaitingPhone => {
                self.draft.phone = Some(text.to_string());
                Ok(())
            }
            WizardStep::AwaitingTelegramId => {
                self.draft.telegram_id = match text {
                    "" | "-" => None,
                    id => Some(id.to_string()),
                };
                Ok(())
            }
            WizardStep::AwaitingMembershipType => {
                self.draft.membership_type = Some(text.to_string());
                Ok(())
            }
            WizardStep::AwaitingStartDate => {
                parse_date(text).map(|date| self.draft.start_date = Some(date))
            }
            WizardStep::AwaitingEndDate => {
                parse_date(text).map(|date| self.draft.end_date = Some(date))
            }
            WizardStep::AwaitingPayment => {
                let record = parse_amount(text).and_then(|amount| self.draft.finish(amount, today));
                return match record {
                    Ok(record) => {
                        *self = WizardSession::default();
                        Transition::Completed(record)
                    }
                    Err(error) => Transition::Rejected {
                        step: self.step,
                        error,
                    },
                };
            }
        };

        match stored {
            Ok(()) => {
                self.step = self.step.next();
                Transition::Prompt(self.step)
            }
            Err(error) => Transition::Rejected {
                step: self.step,
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    fn feed(session: &mut WizardSession, inputs: &[&str]) -> Vec<Transition> {
        inputs
            .iter()
            .map(|text| session.apply(WizardInput::Text(text), today()))
            .collect()
    }

    #[test]
    fn table_is_linear_and_closes_the_loop() {
        let mut step = WizardStep::Idle;
        let mut seen = Vec::new();
        loop {
            step = step.next();
            if step == WizardStep::Idle {
                break;
            }
            seen.push(step);
        }
        assert_eq!(seen.len(), 7);
        assert_eq!(seen.first(), Some(&WizardStep::AwaitingName));
        assert_eq!(seen.last(), Some(&WizardStep::AwaitingPayment));
    }

    #[test]
    fn happy_path_commits_and_goes_idle() {
        let mut s = WizardSession::default();
        assert_eq!(
            s.apply(WizardInput::Begin, today()),
            Transition::Prompt(WizardStep::AwaitingName)
        );
        feed(
            &mut s,
            &["Ivan Petrov", "+7 900 000 00 00", "123456", "Group", "01.03.2025", "18.03.2025"],
        );
        assert_eq!(s.step, WizardStep::AwaitingPayment);

        let Transition::Completed(record) = s.apply(WizardInput::Text("3000"), today()) else {
            panic!("expected commit");
        };
        assert_eq!(record.full_name, "Ivan Petrov");
        assert_eq!(record.telegram_id.as_deref(), Some("123456"));
        assert_eq!(record.days_left, 3);
        assert_eq!(record.payment_amount, 3000);
        assert_eq!(s, WizardSession::default());
    }

    #[test]
    fn malformed_dates_self_loop() {
        let mut s = WizardSession::default();
        s.apply(WizardInput::Begin, today());
        feed(&mut s, &["Ann", "555", "-", "Individual"]);
        assert_eq!(s.step, WizardStep::AwaitingStartDate);
        let before = s.draft.clone();

        for bad in ["31-13-2024", "foo"] {
            let t = s.apply(WizardInput::Text(bad), today());
            assert!(matches!(
                t,
                Transition::Rejected {
                    step: WizardStep::AwaitingStartDate,
                    error: ValidationError::Date(_)
                }
            ));
            assert_eq!(s.draft, before);
        }

        feed(&mut s, &["01.03.2025"]);
        assert_eq!(s.step, WizardStep::AwaitingEndDate);
        let before = s.draft.clone();
        let t = s.apply(WizardInput::Text("tomorrow"), today());
        assert!(matches!(t, Transition::Rejected { step: WizardStep::AwaitingEndDate, .. }));
        assert_eq!(s.draft, before);
    }

    #[test]
    fn bad_payment_stays_on_payment() {
        let mut s = WizardSession::default();
        s.apply(WizardInput::Begin, today());
        feed(&mut s, &["Ann", "555", "", "Group", "01.03.2025", "01.04.2025"]);
        assert_eq!(s.draft.telegram_id, None);

        let t = s.apply(WizardInput::Text("three thousand"), today());
        assert_eq!(
            t,
            Transition::Rejected {
                step: WizardStep::AwaitingPayment,
                error: ValidationError::Amount("three thousand".into())
            }
        );
        assert_eq!(s.step, WizardStep::AwaitingPayment);
        assert!(matches!(
            s.apply(WizardInput::Text("2500"), today()),
            Transition::Completed(_)
        ));
    }

    #[test]
    fn cancel_discards_everything_from_any_step() {
        for steps_done in 0..7 {
            let mut s = WizardSession::default();
            s.apply(WizardInput::Begin, today());
            let inputs = ["Ann", "555", "1", "Group", "01.03.2025", "01.04.2025"];
            feed(&mut s, &inputs[..steps_done.min(inputs.len())]);
            assert!(s.is_active());

            assert_eq!(s.apply(WizardInput::Cancel, today()), Transition::Cancelled);
            assert_eq!(s, WizardSession::default());

            assert_eq!(
                s.apply(WizardInput::Begin, today()),
                Transition::Prompt(WizardStep::AwaitingName)
            );
            assert_eq!(s.draft, Draft::default());
        }
    }

    #[test]
    fn idle_ignores_text_and_cancel() {
        let mut s = WizardSession::default();
        assert_eq!(s.apply(WizardInput::Text("hello"), today()), Transition::Ignored);
        assert_eq!(s.apply(WizardInput::Cancel, today()), Transition::Ignored);
        assert!(!s.is_active());
    }

    #[test]
    fn end_before_start_is_accepted() {
        let mut s = WizardSession::default();
        s.apply(WizardInput::Begin, today());
        feed(&mut s, &["Ann", "555", "-", "Group", "10.03.2025", "01.03.2025"]);
        let Transition::Completed(record) = s.apply(WizardInput::Text("100"), today()) else {
            panic!("expected commit");
        };
        assert_eq!(record.days_left, -14);
    }
}
