use std::io::{Read, Seek, SeekFrom};

use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use serde::Deserialize;

use crate::domain::consumption::{NewConsumption, ResourceAmounts, UpdateConsumption, validate_year};
use crate::domain::types::{ClientId, Month};
use crate::forms::{FormError, optional_number};

/// Monthly figures as entered in the consumption form or sent as JSON.
///
/// `client_id` may be omitted by client users; the service fills in their
/// linked hotel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsumptionForm {
    #[serde(default, deserialize_with = "optional_number")]
    pub client_id: Option<i32>,
    pub year: i32,
    pub month: i32,
    #[serde(default, deserialize_with = "optional_number")]
    pub electricity: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub water: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub natural_gas: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub coal: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub accommodation_count: Option<i32>,
}

/// Validated figures without the owning client.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionValues {
    pub client_id: Option<ClientId>,
    pub year: i32,
    pub month: Month,
    pub amounts: ResourceAmounts,
    pub accommodation_count: i32,
}

impl ConsumptionValues {
    pub fn into_new(self, client_id: ClientId) -> NewConsumption {
        NewConsumption {
            client_id,
            year: self.year,
            month: self.month,
            amounts: self.amounts,
            accommodation_count: self.accommodation_count,
        }
    }

    pub fn into_update(self) -> UpdateConsumption {
        UpdateConsumption {
            year: self.year,
            month: self.month,
            amounts: self.amounts,
            accommodation_count: self.accommodation_count,
        }
    }
}

impl TryFrom<ConsumptionForm> for ConsumptionValues {
    type Error = FormError;

    fn try_from(form: ConsumptionForm) -> Result<Self, Self::Error> {
        let client_id = form
            .client_id
            .map(ClientId::new)
            .transpose()
            .map_err(|_| FormError::InvalidClientId)?;
        let year = validate_year(form.year).map_err(|err| FormError::invalid("year", err))?;
        let month = Month::try_from(form.month).map_err(|err| FormError::invalid("month", err))?;
        let amounts = ResourceAmounts::new(
            form.electricity.unwrap_or(0.0),
            form.water.unwrap_or(0.0),
            form.natural_gas.unwrap_or(0.0),
            form.coal.unwrap_or(0.0),
        )
        .map_err(|err| FormError::invalid("amounts", err))?;
        let accommodation_count = form.accommodation_count.unwrap_or(0);
        if accommodation_count < 0 {
            return Err(FormError::invalid(
                "accommodation_count",
                "must not be negative",
            ));
        }

        Ok(Self {
            client_id,
            year,
            month,
            amounts,
            accommodation_count,
        })
    }
}

/// Query of the consumption list and analytics endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsumptionQuery {
    #[serde(default, deserialize_with = "optional_number")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "optional_number")]
    pub client_id: Option<i32>,
}

#[derive(MultipartForm)]
pub struct UploadConsumptionForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
    pub client_id: Option<Text<i32>>,
}

impl UploadConsumptionForm {
    /// Reads the uploaded CSV into validated rows.
    pub fn parse(&mut self) -> Result<Vec<ConsumptionValues>, FormError> {
        let file = self.csv.file.as_file_mut();
        file.seek(SeekFrom::Start(0))
            .map_err(|err| FormError::Csv(err.to_string()))?;
        parse_consumption_csv(file)
    }
}

/// Parses `year,month,electricity,water,natural_gas,coal,accommodation_count` rows.
///
/// Blank amount cells count as zero. Errors name the offending line.
pub fn parse_consumption_csv<R: Read>(reader: R) -> Result<Vec<ConsumptionValues>, FormError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in rdr.deserialize::<ConsumptionForm>().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        let form = record.map_err(|err| FormError::Csv(format!("line {line}: {err}")))?;
        let values = ConsumptionValues::try_from(form)
            .map_err(|err| FormError::Csv(format!("line {line}: {err}")))?;
        rows.push(values);
    }

    if rows.is_empty() {
        return Err(FormError::Csv("no rows".to_string()));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_amounts_default_to_zero() {
        let form: ConsumptionForm = serde_html_form::from_str(
            "year=2024&month=3&electricity=1200,5&water=&natural_gas=&coal=&accommodation_count=310",
        )
        .unwrap();
        let values = ConsumptionValues::try_from(form).unwrap();
        assert_eq!(values.client_id, None);
        assert_eq!(values.month.get(), 3);
        assert_eq!(values.amounts.electricity, 1200.5);
        assert_eq!(values.amounts.water, 0.0);
        assert_eq!(values.accommodation_count, 310);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let form = ConsumptionForm {
            year: 2024,
            month: 13,
            ..Default::default()
        };
        assert!(ConsumptionValues::try_from(form).is_err());

        let form = ConsumptionForm {
            year: 2024,
            month: 1,
            coal: Some(-5.0),
            ..Default::default()
        };
        assert!(ConsumptionValues::try_from(form).is_err());
    }

    #[test]
    fn csv_rows_are_parsed() {
        let data = "year,month,electricity,water,natural_gas,coal,accommodation_count\n\
                    2024,1,1000,50,20,0,300\n\
                    2024, 2 ,900,45,,0,280\n";
        let rows = parse_consumption_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].month.get(), 2);
        assert_eq!(rows[1].amounts.natural_gas, 0.0);
        assert_eq!(rows[0].accommodation_count, 300);
    }

    #[test]
    fn csv_errors_name_the_line() {
        let data = "year,month,electricity,water,natural_gas,coal,accommodation_count\n\
                    2024,1,1000,50,20,0,300\n\
                    2024,14,900,45,10,0,280\n";
        let err = parse_consumption_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn empty_csv_is_rejected() {
        let data = "year,month,electricity,water,natural_gas,coal,accommodation_count\n";
        assert!(parse_consumption_csv(data.as_bytes()).is_err());
    }
}
