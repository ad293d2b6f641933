//! Candidate field locations for each supported invoice dialect.
//!
//! Every header and line field is resolved by probing an ordered list of
//! path candidates and taking the first non-empty text value; the lists
//! carry the legacy vendor tags first and the UBL 2.1 locations after
//! them, so new vendor dialects are added here, not in parser logic.
//! Paths follow the matching rules of the element tree: the first segment
//! matches at any depth, `//` re-enables any-depth matching, and
//! namespace prefixes are compared loosely.

// Header fields ------------------------------------------------------------

pub(crate) static INVOICE_NUMBER: &[&str] = &["Dokument/Broj", "cbc:ID"];

pub(crate) static INVOICE_DATE: &[&str] = &["Dokument/Datum", "cbc:IssueDate"];

pub(crate) static SUPPLIER_NAME: &[&str] = &[
    "Dobavljac/Naziv",
    "cac:AccountingSupplierParty//cbc:RegistrationName",
    "cac:AccountingSupplierParty//cac:PartyName/cbc:Name",
];

pub(crate) static NET_TOTAL: &[&str] = &[
    "Vrednosti/NetoFakturna",
    "cac:LegalMonetaryTotal/cbc:TaxExclusiveAmount",
];

pub(crate) static CURRENCY: &[&str] = &["Dokument/Valuta", "cbc:DocumentCurrencyCode"];

pub(crate) static DUE_DATE: &[&str] = &[
    "Valutacije/Valutacija/Datum",
    "cbc:DueDate",
    "cac:PaymentMeans/cbc:PaymentDueDate",
];

pub(crate) static CASH_DISCOUNT: &[&str] = &["Valutacije/Valutacija/Popust"];

pub(crate) static PAYABLE_AMOUNT: &[&str] = &[
    "Valutacije/Valutacija/Vrednost",
    "cac:LegalMonetaryTotal/cbc:PayableAmount",
];

// Line containers ----------------------------------------------------------

pub(crate) static LEGACY_LINES: &[&str] = &["Stavke/Stavka", "Stavka"];

pub(crate) static UBL_LINES: &[&str] = &["cac:InvoiceLine"];

// Line fields (relative to one line element) -------------------------------

pub(crate) static LINE_SUPPLIER_CODE: &[&str] =
    &["Sifra", "cac:Item/cac:SellersItemIdentification/cbc:ID"];

pub(crate) static LINE_BARCODE: &[&str] =
    &["GTIN", "cac:Item/cac:StandardItemIdentification/cbc:ID"];

pub(crate) static LINE_NAME: &[&str] = &["Naziv", "cac:Item/cbc:Name"];

pub(crate) static LINE_QUANTITY: &[&str] = &["Kolicina", "cbc:InvoicedQuantity"];

pub(crate) static LINE_PURCHASE_PRICE: &[&str] =
    &["CenaFakturna", "cac:Price/cbc:PriceAmount"];

pub(crate) static LINE_DISCOUNT_PCT: &[&str] = &[
    "RabatProcenat",
    "cac:AllowanceCharge/cbc:MultiplierFactorNumeric",
];

pub(crate) static LINE_VAT_PCT: &[&str] = &[
    "PorezProcenat",
    "cac:Item/cac:ClassifiedTaxCategory/cbc:Percent",
    "cac:TaxTotal/cac:TaxSubtotal/cac:TaxCategory/cbc:Percent",
];

pub(crate) static LINE_BATCH: &[&str] = &["BrojSerije"];

pub(crate) static LINE_EXPIRY: &[&str] = &["RokUpotrebe"];
