pub mod antispam;
