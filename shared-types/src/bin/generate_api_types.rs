use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for API types
    let mut types = Vec::new();

    // Company types
    types.push(clean_type(CompanyCategory::export_to_string()?));
    types.push(clean_type(CompanyDetails::export_to_string()?));
    types.push(clean_type(Company::export_to_string()?));
    types.push(clean_type(CreateCompanyRequest::export_to_string()?));
    types.push(clean_type(UpdateCompanyRequest::export_to_string()?));
    types.push(clean_type(CompaniesResponse::export_to_string()?));
    types.push(clean_type(LogoUploadResponse::export_to_string()?));

    // Browse and search
    types.push(clean_type(CategorySummary::export_to_string()?));
    types.push(clean_type(CategoriesResponse::export_to_string()?));
    types.push(clean_type(SearchResponse::export_to_string()?));

    // Status and validation
    types.push(clean_type(BackendMode::export_to_string()?));
    types.push(clean_type(StatusResponse::export_to_string()?));
    types.push(clean_type(FieldError::export_to_string()?));
    types.push(clean_type(ValidationErrorResponse::export_to_string()?));

    let output_dir = Path::new("../web/src/api-types");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    // Company imports CompanyDetails and CompanyCategory; everything lands in one file
    let filtered: Vec<&str> = type_def
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}
