//! Quote Sheet
//!
//! Terminal rendering of a quote: the totals breakdown, the three package tiers side by side
//! and any notices staff should see before the quote goes out.

use std::{fmt::Display, io};

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    financing::MonthlyPayment,
    money::{rounded, whole_units},
    packages::PackageOption,
    quote::QuoteTotals,
};

/// Errors that can occur when writing a quote sheet.
#[derive(Debug, Error)]
pub enum QuoteSheetError {
    /// Output could not be written
    #[error("Failed to write quote sheet: {0}")]
    Io(#[from] io::Error),
}

/// A quote ready to be shown to a customer.
#[derive(Debug, Clone)]
pub struct QuoteSheet<'q, 'a> {
    title: String,
    promotions: Vec<String>,
    totals: &'q QuoteTotals<'a>,
    payment: &'q MonthlyPayment<'a>,
    packages: &'q [PackageOption<'a>],
    notices: Vec<String>,
}

impl<'q, 'a> QuoteSheet<'q, 'a> {
    /// Sheet for `totals` and `payment` under the heading `title`.
    pub fn new(
        title: impl Into<String>,
        totals: &'q QuoteTotals<'a>,
        payment: &'q MonthlyPayment<'a>,
    ) -> Self {
        Self {
            title: title.into(),
            promotions: Vec::new(),
            totals,
            payment,
            packages: &[],
            notices: Vec::new(),
        }
    }

    /// Name the promotions applied to the quote.
    #[must_use]
    pub fn with_promotions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.promotions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Include the package comparison.
    #[must_use]
    pub fn with_packages(mut self, packages: &'q [PackageOption<'a>]) -> Self {
        self.packages = packages;
        self
    }

    /// Add notices. Package warranty notices are collected automatically.
    #[must_use]
    pub fn with_notices<I, N>(mut self, notices: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Display,
    {
        self.notices
            .extend(notices.into_iter().map(|notice| notice.to_string()));
        self
    }

    /// Every notice on the sheet, package warranty notices first, without duplicates.
    pub fn notices(&self) -> Vec<String> {
        let mut notices: Vec<String> = Vec::new();

        let package_notices = self
            .packages
            .iter()
            .filter_map(|package| package.warranty.notice)
            .map(|notice| notice.to_string());

        for notice in package_notices.chain(self.notices.iter().cloned()) {
            if !notices.contains(&notice) {
                notices.push(notice);
            }
        }

        notices
    }

    /// Write the sheet.
    ///
    /// # Errors
    ///
    /// Returns a [`QuoteSheetError`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), QuoteSheetError> {
        writeln!(out, "\n{}", self.title)?;

        if !self.promotions.is_empty() {
            writeln!(out, "Promotions: {}", self.promotions.join(", "))?;
        }

        writeln!(out, "\n{}", totals_table(self.totals, self.payment))?;

        if !self.packages.is_empty() {
            writeln!(out, "\n{}", packages_table(self.packages))?;
        }

        let notices = self.notices();

        if !notices.is_empty() {
            writeln!(out, "\nNotices:")?;

            for notice in notices {
                writeln!(out, "  ! {notice}")?;
            }
        }

        Ok(())
    }
}

fn totals_table(totals: &QuoteTotals<'_>, payment: &MonthlyPayment<'_>) -> String {
    let mut builder = Builder::default();

    builder.push_record(["", "Amount"]);

    builder.push_record(["MSRP".to_string(), money(&totals.msrp)]);
    push_credit(&mut builder, "Dealer discount", &totals.discount);
    push_credit(&mut builder, "Promotions", &totals.promo_value);
    push_credit(&mut builder, "Admin discount", &totals.admin_discount);

    if !totals.accessories.is_zero() {
        builder.push_record(["Options".to_string(), money(&totals.accessories)]);
    }

    push_credit(&mut builder, "Trade-in", &totals.trade_in);

    builder.push_record(["Subtotal".to_string(), money(&totals.subtotal)]);
    builder.push_record(["Tax".to_string(), money(&totals.tax)]);
    builder.push_record(["Total".to_string(), money(&totals.total)]);
    builder.push_record(["You save".to_string(), money(&totals.savings)]);
    builder.push_record(["Monthly".to_string(), monthly(payment)]);

    let mut table = builder.build();
    let rows = table.count_rows();

    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);
    // Subtotal, tax and total sit below a rule
    theme.insert_horizontal_line(rows.saturating_sub(5), separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..), Alignment::right());

    table.to_string()
}

fn push_credit(builder: &mut Builder, label: &str, credit: &Money<'_, Currency>) {
    if !credit.is_zero() {
        builder.push_record([label.to_string(), format!("-{}", money(credit))]);
    }
}

fn packages_table(packages: &[PackageOption<'_>]) -> String {
    let mut builder = Builder::default();

    builder.push_record(
        std::iter::once(String::new()).chain(packages.iter().map(|package| {
            if package.recommended {
                format!("{} *", package.label)
            } else {
                package.label.to_string()
            }
        })),
    );

    builder.push_record(package_row("Before tax", packages, |package| {
        money(&package.price_before_tax)
    }));
    builder.push_record(package_row("Total", packages, |package| {
        money(&package.totals.total)
    }));
    builder.push_record(package_row("Coverage", packages, |package| {
        format!("{} years", package.coverage_years)
    }));
    builder.push_record(package_row("Monthly", packages, |package| {
        monthly(&package.financing)
    }));
    builder.push_record(package_row("Includes", packages, |package| {
        package.features.join("\n")
    }));

    let mut table = builder.build();

    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::first(), Color::BOLD);

    let mut rendered = table.to_string();

    if packages.iter().any(|package| package.recommended) {
        rendered.push_str("\n* recommended");
    }

    rendered
}

fn package_row(
    label: &str,
    packages: &[PackageOption<'_>],
    cell: impl Fn(&PackageOption<'_>) -> String,
) -> Vec<String> {
    std::iter::once(label.to_string())
        .chain(packages.iter().map(cell))
        .collect()
}

fn money(value: &Money<'_, Currency>) -> String {
    rounded(value).to_string()
}

fn monthly(payment: &MonthlyPayment<'_>) -> String {
    let mut cell = format!(
        "{}/mo, {} mo @ {}%",
        whole_units(&payment.payment),
        payment.term_months,
        payment.rate.normalize()
    );

    if payment.deferred_months > 0 {
        cell = format!("{cell}, first payment in {} mo", payment.deferred_months);
    }

    cell
}
