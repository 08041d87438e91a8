pub fn invoice_number_present(invoice_number: &str) -> Result<(), String> {
    if invoice_number.is_empty() {
        return Err("Invoice number is required".to_string());
    }
    Ok(())
}

pub fn shop_present(shop: &str) -> Result<(), String> {
    if shop.is_empty() {
        return Err("Shop is required".to_string());
    }
    Ok(())
}
