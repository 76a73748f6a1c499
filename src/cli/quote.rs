use super::show::source_label;
use super::ui;
use crate::PriceSnapshot;
use crate::core::format::format_price;
use crate::core::plan::Cell;

pub fn render(snapshot: &PriceSnapshot, cell: Cell) -> String {
    let price = snapshot.matrix.get(cell);
    let mut output = format!(
        "{} {} ({})\n",
        ui::style_text(&cell.tier.to_string(), ui::StyleType::Title),
        cell.period,
        cell.currency
    );
    output.push_str(&format!(
        "{} {} {}\n",
        ui::style_text("Price:", ui::StyleType::Label),
        ui::style_text(
            &format_price(price.entry.amount, cell.currency),
            ui::StyleType::Price
        ),
        ui::style_text(&format!("[{}]", source_label(&price.source)), ui::StyleType::Subtle)
    ));
    output.push_str(&format!(
        "{} {}",
        ui::style_text("Checkout ref:", ui::StyleType::Label),
        snapshot.matrix.checkout_ref(cell)
    ));
    if snapshot.outdated {
        output.push_str(&format!(
            "\n{}",
            ui::style_text("Prices may be outdated.", ui::StyleType::Warning)
        ));
    }
    output
}

pub fn run(snapshot: &PriceSnapshot, cell: Cell) {
    println!("{}", render(snapshot, cell));
}
