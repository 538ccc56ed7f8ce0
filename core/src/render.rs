//! Drawing the two front-ends.
//!
//! LCD screens are two 16-column rows redrawn from scratch. Console output is
//! plain `\r\n`-terminated text meant for a human at a serial terminal.

use core::fmt::{self, Write};

use heapless::String;

use crate::display::{CharDisplay, LCD_COLS};
use crate::editor::{KeyEditBuffer, TextEditBuffer};
use crate::engine::CardReadout;
use crate::error::CardError;
use crate::keys::{format_key, Key, KEY_HEX_LEN};
use crate::serial::SerialPort;
use crate::state::{MenuItem, MenuSelection};

/// Characters of card data that fit after `"Data:"`.
const LCD_DATA_WINDOW: usize = LCD_COLS as usize - 5;

fn lcd_screen<D: CharDisplay>(lcd: &mut D, top: &str, bottom: &str) {
    lcd.hide_caret();
    lcd.clear();
    lcd.set_cursor(0, 0);
    lcd.print(top);
    lcd.set_cursor(0, 1);
    lcd.print(bottom);
}

pub(crate) fn lcd_menu<D: CharDisplay>(lcd: &mut D, selection: &MenuSelection) {
    let mut top: String<16> = String::new();
    let mut bottom: String<16> = String::new();
    let _ = write!(top, ">{}", selection.current().label());
    let _ = write!(bottom, " {}", selection.following().label());
    lcd_screen(lcd, &top, &bottom);
}

pub(crate) fn lcd_text_editor<D: CharDisplay>(lcd: &mut D, text: &TextEditBuffer) {
    lcd_screen(lcd, "Enter text:", text.as_str());
    lcd.set_cursor(text.cursor() as u8, 1);
    lcd.show_caret();
}

pub(crate) fn lcd_key_editor<D: CharDisplay>(lcd: &mut D, key: &KeyEditBuffer) {
    let digits: String<KEY_HEX_LEN> = (0..KEY_HEX_LEN)
        .map(|pos| {
            if pos == key.cursor() {
                key.candidate_digit() as char
            } else {
                key.digit_at(pos).map_or('_', char::from)
            }
        })
        .collect();
    lcd_screen(lcd, "New key (hex):", &digits);
    lcd.set_cursor(key.cursor() as u8, 1);
    lcd.show_caret();
}

pub(crate) fn lcd_serial_prompt<D: CharDisplay>(lcd: &mut D) {
    lcd_screen(lcd, "Serial input...", "Select=cancel");
}

pub(crate) fn lcd_waiting<D: CharDisplay>(lcd: &mut D, item: MenuItem) {
    lcd_screen(lcd, item.label(), "Place card...");
}

pub(crate) fn lcd_status<D: CharDisplay>(lcd: &mut D, top: &str, bottom: &str) {
    lcd_screen(lcd, top, bottom);
}

pub(crate) fn lcd_readout<D: CharDisplay>(lcd: &mut D, readout: &CardReadout) {
    let mut top: String<16> = String::new();
    let mut bottom: String<16> = String::new();
    let _ = write!(top, "UID:{}", readout.uid_hex());
    let printable = readout.printable();
    let window = printable.get(..LCD_DATA_WINDOW).unwrap_or(printable.as_str());
    let _ = write!(bottom, "Data:{window}");
    lcd_screen(lcd, &top, &bottom);
}

fn line<S: SerialPort>(serial: &mut S, args: fmt::Arguments<'_>) {
    let _ = serial.write_fmt(args);
    let _ = serial.write_str("\r\n");
}

pub(crate) fn serial_banner<S: SerialPort>(serial: &mut S) {
    line(serial, format_args!("CardMate - MIFARE Classic read/write/format tool"));
}

pub(crate) fn serial_menu<S: SerialPort>(serial: &mut S) {
    line(serial, format_args!(""));
    line(serial, format_args!("=== Main Menu ==="));
    for (number, item) in (1..).zip(MenuItem::SERIAL_ORDER) {
        line(serial, format_args!("{number}. {}", item.label()));
    }
    line(serial, format_args!("Select option (1-5):"));
}

pub(crate) fn serial_invalid_option<S: SerialPort>(serial: &mut S, choice: &str) {
    line(serial, format_args!("Invalid option: {choice}"));
}

pub(crate) fn serial_text_prompt<S: SerialPort>(serial: &mut S) {
    line(serial, format_args!("Enter custom text (max 16 chars):"));
}

pub(crate) fn serial_key_prompt<S: SerialPort>(serial: &mut S) {
    line(serial, format_args!("Enter new key (12 hex digits):"));
}

pub(crate) fn serial_waiting<S: SerialPort>(serial: &mut S, item: MenuItem) {
    line(serial, format_args!("{}: place card on reader...", item.label()));
}

pub(crate) fn serial_failure<S: SerialPort>(serial: &mut S, item: MenuItem, err: &CardError) {
    line(serial, format_args!("{} failed: {err}", item.label()));
}

pub(crate) fn serial_written<S: SerialPort>(serial: &mut S, item: MenuItem, text: &str) {
    line(serial, format_args!("{}: OK, wrote \"{text}\"", item.label()));
}

pub(crate) fn serial_formatted<S: SerialPort>(serial: &mut S, sectors: u8) {
    line(serial, format_args!("Format Card: OK, {sectors} sectors wiped"));
}

pub(crate) fn serial_readout<S: SerialPort>(serial: &mut S, readout: &CardReadout) {
    line(serial, format_args!("UID: {}", readout.uid_hex()));
    line(serial, format_args!("Data: {}", readout.printable()));
    line(serial, format_args!("Hex: {}", readout.hex_dump()));
}

pub(crate) fn serial_key_changed<S: SerialPort>(serial: &mut S, key: &Key) {
    line(serial, format_args!("Change Key: OK, user key is now {}", format_key(key)));
}
