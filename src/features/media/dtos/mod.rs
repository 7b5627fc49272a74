pub mod media_dto;

pub use media_dto::{
    DeleteMediaResponseDto, MediaResponseDto, RenameMediaDto, UploadMediaBase64Dto,
    UploadMediaDto,
};
