//! Message rendering.
//!
//! Bodies are small HTML documents. Every interpolated party name and status
//! label is escaped.

use agenda_core::{
  appointment::Appointment,
  channel::Message,
  party::Contact,
  status::Status,
};
use chrono::{DateTime, FixedOffset, Offset, Utc};

#[derive(Debug, Clone)]
pub struct Templates {
  /// Product name used in subjects and sign-offs.
  pub brand:      String,
  /// Offset appointment times are shown in.
  pub utc_offset: FixedOffset,
}

impl Default for Templates {
  fn default() -> Self {
    Self { brand: "Agenda".to_owned(), utc_offset: Utc.fix() }
  }
}

impl Templates {
  pub fn new(brand: impl Into<String>, utc_offset: FixedOffset) -> Self {
    Self { brand: brand.into(), utc_offset }
  }

  /// Confirmation sent to the student after a booking.
  pub fn booking_confirmation(
    &self,
    student: &Contact,
    psychologist: &Contact,
    appointment: &Appointment,
  ) -> Message {
    let brand = escape_html(&self.brand);
    let body = format!(
      "<html><body>\
       <h2>Your appointment is confirmed</h2>\
       <p>Hello {student},</p>\
       <p>Your appointment with <strong>{psychologist}</strong> is booked for \
       <strong>{when}</strong>.</p>\
       <p>If you cannot attend, please cancel in advance.</p>\
       <p>{brand} team</p>\
       </body></html>",
      student = escape_html(&student.name),
      psychologist = escape_html(&psychologist.name),
      when = self.format_start(appointment.starts_at),
    );

    Message {
      to: student.email.clone(),
      subject: format!("Appointment confirmation - {}", self.brand),
      body,
    }
  }

  /// Notice sent to the student after a status change.
  pub fn status_change(&self, student: &Contact, status: &Status) -> Message {
    let body = format!(
      "<html><body>\
       <h2>Appointment update</h2>\
       <p>Hello {student},</p>\
       <p>The status of your appointment is now: <strong>{status}</strong>.</p>\
       <p>{brand} team</p>\
       </body></html>",
      student = escape_html(&student.name),
      status = escape_html(status.as_str()),
      brand = escape_html(&self.brand),
    );

    Message {
      to: student.email.clone(),
      subject: format!("Appointment update: {status}"),
      body,
    }
  }

  fn format_start(&self, starts_at: DateTime<Utc>) -> String {
    starts_at
      .with_timezone(&self.utc_offset)
      .format("%d/%m/%Y at %H:%M")
      .to_string()
  }
}

fn escape_html(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for c in raw.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}
