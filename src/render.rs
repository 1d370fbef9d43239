//! Conversion of a [`ReportLayout`] into `genpdf` elements.

use std::path::Path;

use genpdf::elements::{Break, FrameCellDecorator, LinearLayout, PageBreak, Paragraph, TableLayout};
use genpdf::error::Error;
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element, Margins};

use crate::config::ReportStyles;
use crate::elements::{optional_image, Edge, RuleCellDecorator, ShadedText};
use crate::layout::{
    CoverPage, ReportLayout, SignatureBlock, TableRow, TaskTable, WeekHeader, WeekPage,
    COVER_TITLE, DISCLAIMER, HOURS_COLUMN, WEEK_TITLE,
};

/// Pushes the cover and all week pages of `layout` onto `document`.
///
/// Week pages are preceded by a page break rather than followed by one, so no blank page trails
/// the report.
pub fn push_report(
    document: &mut Document,
    layout: &ReportLayout,
    styles: &ReportStyles,
) -> Result<(), Error> {
    document.push(cover_page(&layout.cover, styles)?);
    for page in &layout.weeks {
        document.push(PageBreak::new());
        document.push(week_page(page, styles)?);
    }
    Ok(())
}

fn cell_margins(styles: &ReportStyles) -> Margins {
    Margins::vh(styles.cell_padding_mm / 2.0, styles.cell_padding_mm)
}

fn empty_cell() -> Paragraph {
    Paragraph::new("")
}

fn cover_page(cover: &CoverPage, styles: &ReportStyles) -> Result<LinearLayout, Error> {
    let mut layout = LinearLayout::vertical();

    if let Some(logo) = &cover.logo {
        layout.push(optional_image(Some(logo.as_path()), styles.logo, Alignment::Right));
        layout.push(Break::new(1.5));
    }

    layout.push(
        Paragraph::new(COVER_TITLE)
            .aligned(Alignment::Center)
            .styled(Style::new().bold().with_font_size(styles.cover_title_size)),
    );
    layout.push(Break::new(1));

    let mut table = TableLayout::new(styles.cover_columns.to_vec());
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    for field in &cover.fields {
        table
            .row()
            .element(Paragraph::new(field.label).padded(cell_margins(styles)))
            .element(Paragraph::new(field.value.clone()).padded(cell_margins(styles)))
            .push()?;
    }
    layout.push(table.styled(Style::new().with_font_size(styles.cover_table_size)));

    Ok(layout)
}

fn week_page(page: &WeekPage, styles: &ReportStyles) -> Result<LinearLayout, Error> {
    let mut layout = LinearLayout::vertical();

    layout.push(week_header(&page.header, styles)?);
    layout.push(Break::new(1));

    if !page.tasks.is_empty() {
        layout.push(task_table(&page.tasks, styles)?);
    }
    layout.push(Break::new(2));

    layout.push(
        Paragraph::new(DISCLAIMER).styled(
            Style::new()
                .with_font_size(styles.disclaimer_size)
                .with_line_spacing(1.45),
        ),
    );
    layout.push(Break::new(1));

    layout.push(signature_block(&page.signature, styles)?);
    Ok(layout)
}

fn week_header(header: &WeekHeader, styles: &ReportStyles) -> Result<TableLayout, Error> {
    let mut table = TableLayout::new(styles.header_columns.to_vec());

    table
        .row()
        .element(
            Paragraph::new(WEEK_TITLE)
                .styled(Style::new().bold().with_font_size(styles.header_title_size))
                .padded(Margins::vh(3.5, 0.0)),
        )
        .element(optional_image(
            header.logo.as_deref(),
            styles.logo,
            Alignment::Right,
        ))
        .push()?;

    let row_style = Style::new().with_font_size(styles.header_row_size);
    for (label, value) in header.rows() {
        table
            .row()
            .element(Paragraph::new(label).styled(row_style))
            .element(
                Paragraph::new(value)
                    .aligned(Alignment::Right)
                    .styled(row_style),
            )
            .push()?;
    }

    Ok(table)
}

fn task_table(tasks: &TaskTable, styles: &ReportStyles) -> Result<impl Element, Error> {
    let rule = styles.rule_color;
    let mut decorator = RuleCellDecorator::new()
        .with_outline(rule)
        .with_divider_before(1, rule);

    let mut table = TableLayout::new(styles.task_columns.to_vec());
    for (index, row) in tasks.rows().into_iter().enumerate() {
        match row {
            TableRow::SectionHeader { title, separated } => {
                decorator = decorator.with_row_rule(index, Edge::Bottom, rule);
                if separated {
                    decorator = decorator.with_row_rule(index, Edge::Top, rule);
                }
                table
                    .row()
                    .element(
                        ShadedText::new(title, styles.section_shade)
                            .with_padding(styles.cell_padding_mm),
                    )
                    .element(
                        ShadedText::new(HOURS_COLUMN, styles.section_shade)
                            .with_alignment(Alignment::Right)
                            .with_padding(styles.cell_padding_mm),
                    )
                    .push()?;
            }
            TableRow::Entry(task) => {
                table
                    .row()
                    .element(Paragraph::new(task.description.clone()).padded(cell_margins(styles)))
                    .element(
                        Paragraph::new(task.hours.clone())
                            .aligned(Alignment::Right)
                            .padded(cell_margins(styles)),
                    )
                    .push()?;
            }
        }
    }
    table.set_cell_decorator(decorator);

    Ok(table.styled(Style::new().with_font_size(styles.task_table_size)))
}

fn signature_date_cell(
    block: &SignatureBlock,
    signature: Option<&Path>,
    styles: &ReportStyles,
) -> Result<TableLayout, Error> {
    let mut cell = TableLayout::new(styles.signature_date_columns.to_vec());
    cell.row()
        .element(
            Paragraph::new(block.date_label())
                .aligned(Alignment::Center)
                .styled(Style::new().with_font_size(styles.signature_date_size)),
        )
        .element(optional_image(signature, styles.signature, Alignment::Left))
        .push()?;
    Ok(cell)
}

fn signature_block(block: &SignatureBlock, styles: &ReportStyles) -> Result<TableLayout, Error> {
    let rule = styles.signature_rule_color;
    let caption_style = Style::new()
        .with_font_size(styles.signature_caption_size)
        .with_color(styles.signature_caption_color);
    let caption = |text: &str| {
        Paragraph::new(text)
            .styled(caption_style)
            .padded(Margins::trbl(1.0, 0.0, 10.6, 0.0))
    };

    let decorator = RuleCellDecorator::new()
        .with_cell_rule(0, 0, Edge::Bottom, rule)
        .with_cell_rule(0, 2, Edge::Bottom, rule)
        .with_cell_rule(3, 0, Edge::Top, rule)
        .with_cell_rule(3, 2, Edge::Top, rule)
        .with_cell_rule(4, 2, Edge::Top, rule);

    let mut table = TableLayout::new(styles.signature_columns.to_vec());
    table
        .row()
        .element(signature_date_cell(
            block,
            block.student_signature.as_deref(),
            styles,
        )?)
        .element(empty_cell())
        .element(signature_date_cell(
            block,
            block.trainer_signature.as_deref(),
            styles,
        )?)
        .push()?;

    let tiers = [
        (SignatureBlock::STUDENT_CAPTION, SignatureBlock::TRAINER_CAPTION),
        (SignatureBlock::ACKNOWLEDGED, SignatureBlock::OTHER_REMARKS),
        (
            SignatureBlock::GUARDIAN_CAPTION,
            SignatureBlock::WORKS_COUNCIL_CAPTION,
        ),
        ("", SignatureBlock::SCHOOL_CAPTION),
    ];
    for (left, right) in tiers {
        table
            .row()
            .element(caption(left))
            .element(empty_cell())
            .element(caption(right))
            .push()?;
    }

    table.set_cell_decorator(decorator);
    Ok(table)
}
