//! Shopper-facing status copy. The storefront speaks Indonesian.

pub const PLAYER_ID_REQUIRED: &str = "Masukkan Player ID terlebih dahulu.";
pub const ORDER_CREATED: &str = "Order dibuat. Klik pembayaran untuk lanjut ke FPX.";
pub const CREATE_ORDER_FAILED: &str = "Gagal membuat order";
pub const ORDER_REQUIRED: &str = "Buat order dulu.";
pub const PAYMENT_OPENED: &str =
    "Pembayaran dibuka di tab baru. Setelah bayar, sistem akan mengirim top-up otomatis.";
pub const MISSING_PAY_URL: &str = "Tidak ada URL pembayaran. Cek kembali backend.";
pub const STILL_PENDING: &str = "Menunggu konfirmasi pembayaran... masih pending.";
pub const PAYMENT_RECEIVED: &str = "Pembayaran diterima - melakukan top-up otomatis sekarang...";
pub const DELIVERED: &str = "Top-up berhasil! Cek game kamu.";
pub const TOPUP_DELIVERED: &str = "Top-up berhasil - order selesai.";
pub const TOPUP_FAILED: &str = "Top-up gagal";
pub const POLLING_CANCELLED: &str = "Cek status pembayaran dihentikan.";
pub const UNKNOWN_DETAIL: &str = "unknown";
pub const PROCESSING_STATUS: &str = "processing";

pub fn transaction_failed(detail: Option<&str>) -> String {
    format!("Transaksi gagal: {}", detail.unwrap_or(UNKNOWN_DETAIL))
}

pub fn status_check_failed(reason: &str) -> String {
    format!("Gagal cek status order: {reason}")
}

pub fn topup_processing(status: Option<&str>) -> String {
    format!("Top-up diproses: {}", status.unwrap_or(PROCESSING_STATUS))
}

pub fn topup_error(reason: &str) -> String {
    format!("Error topup: {reason}")
}
