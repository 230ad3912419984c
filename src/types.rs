/// Типы данных: записи о покупках автомобилей

use std::fmt;

use serde::{Deserialize, Serialize};

/// Строка датасета. Числовые ячейки могут быть пустыми (None).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Customer e-mail")]
    pub customer_email: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Gender")]
    pub gender: Option<f64>,
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "Annual Salary")]
    pub annual_salary: Option<f64>,
    #[serde(rename = "Credit Card Debt")]
    pub credit_card_debt: Option<f64>,
    #[serde(rename = "Net Worth")]
    pub net_worth: Option<f64>,
    #[serde(rename = "Car Purchase Amount")]
    pub car_purchase_amount: Option<f64>,
}

/// Числовые колонки датасета
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Gender,
    Age,
    AnnualSalary,
    CreditCardDebt,
    NetWorth,
    CarPurchaseAmount,
}

impl Column {
    pub const NUMERIC: [Column; 6] = [
        Column::Gender,
        Column::Age,
        Column::AnnualSalary,
        Column::CreditCardDebt,
        Column::NetWorth,
        Column::CarPurchaseAmount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Gender => "Gender",
            Column::Age => "Age",
            Column::AnnualSalary => "Annual Salary",
            Column::CreditCardDebt => "Credit Card Debt",
            Column::NetWorth => "Net Worth",
            Column::CarPurchaseAmount => "Car Purchase Amount",
        }
    }

    pub fn value(self, record: &CustomerRecord) -> Option<f64> {
        match self {
            Column::Gender => record.gender,
            Column::Age => record.age,
            Column::AnnualSalary => record.annual_salary,
            Column::CreditCardDebt => record.credit_card_debt,
            Column::NetWorth => record.net_worth,
            Column::CarPurchaseAmount => record.car_purchase_amount,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Все колонки в порядке файла
pub const ALL_COLUMNS: [&str; 9] = [
    "Customer Name",
    "Customer e-mail",
    "Country",
    "Gender",
    "Age",
    "Annual Salary",
    "Credit Card Debt",
    "Net Worth",
    "Car Purchase Amount",
];

/// Признаки после удаления имени, e-mail, страны и цели
pub const FEATURE_COLUMNS: [Column; 5] = [
    Column::Gender,
    Column::Age,
    Column::AnnualSalary,
    Column::CreditCardDebt,
    Column::NetWorth,
];

pub const TARGET_COLUMN: Column = Column::CarPurchaseAmount;

/// Неизменяемая таблица, загружается один раз
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<CustomerRecord>,
}

impl Dataset {
    pub fn new(records: Vec<CustomerRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), ALL_COLUMNS.len())
    }

    pub fn head(&self, n: usize) -> &[CustomerRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn tail(&self, n: usize) -> &[CustomerRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    pub fn column(&self, column: Column) -> Vec<Option<f64>> {
        self.records.iter().map(|r| column.value(r)).collect()
    }

    /// Подмножество строк по индексам (для разбиения train/test)
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset::new(indices.iter().map(|&i| self.records[i].clone()).collect())
    }
}
